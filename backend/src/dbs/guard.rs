use crate::dbs::{DbError, DbResult};

/// `replace()` is also a string function, so REPLACE is only a write when
/// it opens a `REPLACE INTO` statement.
const WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "ATTACH", "DETACH",
    "PRAGMA", "VACUUM", "REINDEX", "TRUNCATE", "UPSERT",
];

/// Check that `sql` is a single read-only retrieval and return it without
/// surrounding whitespace or a trailing `;`.
pub fn validate_select(sql: &str) -> DbResult<&str> {
    let statement = sql.trim();
    let statement = statement.strip_suffix(';').unwrap_or(statement).trim_end();
    if statement.is_empty() {
        return Err(DbError::InvalidQuery("empty query".to_string()));
    }

    let words = scan_words(statement)?;
    match words.first().map(|w| w.to_ascii_uppercase()) {
        Some(first) if first == "SELECT" || first == "WITH" => {}
        _ => {
            return Err(DbError::InvalidQuery(
                "Only SELECT queries are allowed".to_string(),
            ));
        }
    }

    if let Some(keyword) = words
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .find(|w| WRITE_KEYWORDS.contains(&w.as_str()))
    {
        return Err(DbError::InvalidQuery(format!(
            "{keyword} is not allowed in a read-only query"
        )));
    }

    if words
        .windows(2)
        .any(|pair| pair[0].eq_ignore_ascii_case("REPLACE") && pair[1].eq_ignore_ascii_case("INTO"))
    {
        return Err(DbError::InvalidQuery(
            "REPLACE is not allowed in a read-only query".to_string(),
        ));
    }

    Ok(statement)
}

/// Collect bare words outside string literals, quoted identifiers and
/// comments. Fails on a statement separator or an unterminated literal.
fn scan_words(sql: &str) -> DbResult<Vec<&str>> {
    let bytes = sql.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote)?;
            }
            b'[' => {
                i = match bytes[i..].iter().position(|&b| b == b']') {
                    Some(offset) => i + offset + 1,
                    None => return Err(unterminated()),
                };
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |offset| i + offset + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = match sql[i + 2..].find("*/") {
                    Some(offset) => i + 2 + offset + 2,
                    None => return Err(unterminated()),
                };
            }
            b';' => {
                return Err(DbError::InvalidQuery(
                    "multiple statements are not allowed".to_string(),
                ));
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                words.push(&sql[start..i]);
            }
            _ => i += 1,
        }
    }

    Ok(words)
}

/// Returns the index just past the closing quote. Doubled quotes are escapes.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> DbResult<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(unterminated())
}

fn unterminated() -> DbError {
    DbError::InvalidQuery("unterminated literal or comment".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_select() {
        let sql = validate_select("  SELECT * FROM heroes WHERE name = 'Batman';  ").unwrap();
        assert_eq!(sql, "SELECT * FROM heroes WHERE name = 'Batman'");
    }

    #[test]
    fn accepts_lowercase_and_cte() {
        assert!(validate_select("select name from heroes").is_ok());
        assert!(validate_select("WITH dc AS (SELECT * FROM heroes WHERE universe = 'DC comics') SELECT * FROM dc").is_ok());
    }

    #[test]
    fn rejects_non_retrieval() {
        for sql in [
            "DROP TABLE heroes",
            "DELETE FROM heroes",
            "UPDATE heroes SET name = 'x'",
            "INSERT INTO heroes VALUES (1, 'a', NULL, 'Marvel')",
            "PRAGMA table_info(heroes)",
            "",
            "   ;",
        ] {
            assert!(
                matches!(validate_select(sql), Err(DbError::InvalidQuery(_))),
                "{sql:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_stacked_statements() {
        let err = validate_select("SELECT * FROM heroes; DROP TABLE heroes").unwrap_err();
        assert!(err.to_string().contains("multiple statements"));
    }

    #[test]
    fn rejects_write_keyword_inside_select() {
        let err = validate_select("SELECT * FROM heroes WHERE id IN (DELETE FROM heroes RETURNING id)")
            .unwrap_err();
        assert!(err.to_string().contains("DELETE"));
    }

    #[test]
    fn replace_function_is_allowed() {
        assert!(validate_select("SELECT replace(name, '-', ' ') FROM heroes").is_ok());
        assert!(validate_select("SELECT * FROM heroes WHERE REPLACE(alias, ' ', '') = 'PeterParker'").is_ok());
    }

    #[test]
    fn replace_statement_is_rejected() {
        let err = validate_select("WITH x AS (SELECT 1) REPLACE INTO heroes VALUES (1, 'a', NULL, 'Marvel')")
            .unwrap_err();
        assert!(err.to_string().contains("REPLACE"));
        assert!(validate_select("REPLACE INTO heroes VALUES (1, 'a', NULL, 'Marvel')").is_err());
    }

    #[test]
    fn keywords_inside_literals_are_data() {
        assert!(validate_select("SELECT * FROM heroes WHERE name = 'Drop; Delete'").is_ok());
        assert!(validate_select("SELECT * FROM heroes WHERE name = 'O''Hara'").is_ok());
        assert!(validate_select("SELECT \"update\" FROM heroes").is_ok());
    }

    #[test]
    fn comments_are_ignored_but_must_close() {
        assert!(validate_select("SELECT * FROM heroes -- drop everything").is_ok());
        assert!(validate_select("SELECT * /* delete */ FROM heroes").is_ok());
        assert!(validate_select("SELECT * /* never closed FROM heroes").is_err());
        assert!(validate_select("SELECT * FROM heroes WHERE name = 'Bat").is_err());
    }
}
