use crate::remote::SearchResponse;
use serde_json::Value;
use shared::models::{CharacterRecord, Universe};

/// Values the search service uses in place of missing data.
const PLACEHOLDERS: &[&str] = &["", "-", "null", "none", "no alter egos found."];

fn present(value: Option<&Value>) -> Option<&str> {
    let text = value?.as_str()?.trim();
    if PLACEHOLDERS.contains(&text.to_lowercase().as_str()) {
        None
    } else {
        Some(text)
    }
}

/// Map one search result object onto a record. Results without a name are skipped.
pub fn record_from_result(result: &Value) -> Option<CharacterRecord> {
    let name = present(result.get("name"))?;
    let biography = result.get("biography");
    let field = |key: &str| present(biography.and_then(|b| b.get(key)));

    let real_name = field("full-name").or_else(|| field("alter-egos")).unwrap_or_default();
    let universe = field("publisher")
        .map(Universe::from_publisher)
        .unwrap_or_default();

    Some(CharacterRecord::new(name, real_name, universe))
}

/// All records in a search document. A non-success document yields nothing;
/// a `results` object that is not an array is treated as a single result.
pub fn records_from_search(response: &SearchResponse) -> Vec<CharacterRecord> {
    if !response.is_success() {
        return Vec::new();
    }
    match &response.results {
        Some(Value::Array(results)) => results.iter().filter_map(record_from_result).collect(),
        Some(result @ Value::Object(_)) => record_from_result(result).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Keep the records whose name matches `term` (case-insensitive equality or
/// containment either way), exact matches first, otherwise in source order.
pub fn rank_matches(records: Vec<CharacterRecord>, term: &str) -> Vec<CharacterRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(u8, CharacterRecord)> = records
        .into_iter()
        .filter_map(|record| {
            let name = record.name.to_lowercase();
            let score = if name == term {
                2
            } else if name.contains(&term) || term.contains(&name) {
                1
            } else {
                0
            };
            (score > 0).then_some((score, record))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn success(results: Value) -> SearchResponse {
        SearchResponse {
            response: "success".to_string(),
            results: Some(results),
            ..Default::default()
        }
    }

    #[test]
    fn joker_from_dc() {
        let response = success(json!([{
            "name": "Joker",
            "biography": {"full-name": "Jack Napier", "alter-egos": "No alter egos found.", "publisher": "DC Comics"}
        }]));
        assert_eq!(
            records_from_search(&response),
            vec![CharacterRecord::new("Joker", "Jack Napier", Universe::Dc)]
        );
    }

    #[test]
    fn real_name_falls_back_to_alter_egos_then_empty() {
        let response = success(json!([
            {"name": "Venom", "biography": {"full-name": "", "alter-egos": "Anti-Venom", "publisher": "Marvel Comics"}},
            {"name": "Bane", "biography": {"publisher": "DC Comics"}},
            {"name": "Nobody"}
        ]));
        let records = records_from_search(&response);
        assert_eq!(records[0].real_name, "Anti-Venom");
        assert_eq!(records[1].real_name, "");
        assert_eq!(records[2], CharacterRecord::new("Nobody", "", Universe::Marvel));
    }

    #[test]
    fn publisher_decides_universe() {
        let response = success(json!([
            {"name": "A", "biography": {"publisher": "marvel comics"}},
            {"name": "B", "biography": {"publisher": "DC Comics"}},
            {"name": "C", "biography": {"publisher": "Image Comics"}},
            {"name": "D", "biography": {"publisher": "-"}}
        ]));
        let universes: Vec<Universe> = records_from_search(&response)
            .into_iter()
            .map(|r| r.universe)
            .collect();
        assert_eq!(
            universes,
            vec![Universe::Marvel, Universe::Dc, Universe::Marvel, Universe::Marvel]
        );
    }

    #[test]
    fn single_object_results() {
        let response = success(json!({"name": "Thanos", "biography": {"full-name": "Thanos", "publisher": "Marvel Comics"}}));
        assert_eq!(records_from_search(&response).len(), 1);
    }

    #[test]
    fn error_document_yields_nothing() {
        let response = SearchResponse {
            response: "error".to_string(),
            error: Some("character with given name not found".to_string()),
            ..Default::default()
        };
        assert!(records_from_search(&response).is_empty());
    }

    #[test]
    fn ranking_prefers_exact_name() {
        let records = vec![
            CharacterRecord::new("Joker Jr", "", Universe::Dc),
            CharacterRecord::new("Harley Quinn", "", Universe::Dc),
            CharacterRecord::new("Joker", "Jack Napier", Universe::Dc),
        ];
        let ranked = rank_matches(records, "joker");
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Joker", "Joker Jr"]);
    }
}
