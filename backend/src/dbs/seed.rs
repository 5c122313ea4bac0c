use crate::dbs::DbResult;
use serde::Deserialize;
use std::path::Path;

/// A row of the seed file: `name,real name,universe`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SeedRecord {
    pub name: String,
    #[serde(rename = "real name", default)]
    pub real_name: Option<String>,
    pub universe: String,
}

impl SeedRecord {
    pub fn new(name: &str, real_name: Option<&str>, universe: &str) -> Self {
        Self {
            name: name.to_string(),
            real_name: real_name.map(str::to_string),
            universe: universe.to_string(),
        }
    }

    /// The alias column value; blank real names are stored as NULL.
    pub fn alias(&self) -> Option<&str> {
        self.real_name
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }
}

pub fn parse_seed<R: std::io::Read>(reader: R) -> DbResult<Vec<SeedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

pub async fn read_seed(path: impl AsRef<Path>) -> DbResult<Vec<SeedRecord>> {
    let content = tokio::fs::read(path.as_ref()).await?;
    parse_seed(content.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_with_spaces() {
        let csv = "name,real name,universe\nBatman,Bruce Wayne,DC comics\nSpider-Man,Peter Parker,Marvel\n";
        let records = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], SeedRecord::new("Batman", Some("Bruce Wayne"), "DC comics"));
        assert_eq!(records[1].universe, "Marvel");
    }

    #[test]
    fn blank_real_name_has_no_alias() {
        let csv = "name,real name,universe\nVision,,Marvel\n";
        let records = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(records[0].alias(), None);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let csv = "name,real name,universe\n\"Cyborg\",\"Stone, Victor\",DC comics\n";
        let records = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(records[0].alias(), Some("Stone, Victor"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "name,universe\nBatman\n";
        assert!(parse_seed(csv.as_bytes()).is_err());
    }
}
