use crate::AppState;
use crate::resolver::ResolveError;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::models::{CharacterRecord, ErrorBody, HeroQuery};

/// Every failure is reported as a client error carrying its description.
#[derive(Debug)]
pub struct ApiError(String);

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        Self(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorBody::new(self.0))).into_response()
    }
}

pub async fn query_heroes(
    State(state): State<AppState>,
    params: Result<Query<HeroQuery>, QueryRejection>,
) -> Result<Json<Vec<CharacterRecord>>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        tracing::error!("Rejected query string: {}", rejection.body_text());
        ApiError(rejection.body_text())
    })?;
    let query = params
        .query
        .ok_or_else(|| ApiError("query parameter is required".to_string()))?;

    let resolver = state.resolvers.build().map_err(|e| {
        tracing::error!("Failed to set up resolver: {:?}", e);
        ApiError::from(e)
    })?;

    let characters = resolver.resolve(&query).await.map_err(|e| {
        tracing::error!("Failed to resolve {:?}: {:?}", query, e);
        ApiError::from(e)
    })?;

    Ok(Json(characters))
}
