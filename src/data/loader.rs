use std::collections::HashSet;

use thiserror::Error;

use super::arff::{self, ArffError};
use super::model::{CellValue, Table, TableError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why the permissive line-based reader gave up.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("no data lines found")]
    NoData,
    #[error("data line {line}: expected {expected} fields, saw {found}")]
    TooManyFields {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("reading delimited data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Both loading strategies failed.
#[derive(Debug, Error)]
#[error("could not parse dataset: {primary}; fallback reader: {fallback}")]
pub struct ParseError {
    pub primary: ArffError,
    pub fallback: FallbackError,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode uploaded bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// second step cannot fail.
pub fn decode_bytes(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(e) => {
            log::debug!("input is not UTF-8 ({e}), decoding as Latin-1");
            raw.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Load a table from ARFF text.
///
/// The strict parser runs first; any failure there hands the text to the
/// line-based fallback. Only if both fail is a [`ParseError`] returned.
pub fn load(text: &str) -> Result<Table, ParseError> {
    let primary = match arff::parse(text) {
        Ok(table) => {
            log::info!(
                "parsed ARFF: {} rows x {} columns",
                table.n_rows(),
                table.n_cols()
            );
            return Ok(table);
        }
        Err(e) => e,
    };

    log::warn!("strict ARFF parse failed ({primary}), using fallback reader");
    match load_fallback(text) {
        Ok(table) => {
            log::info!(
                "fallback reader: {} rows x {} columns",
                table.n_rows(),
                table.n_cols()
            );
            Ok(table)
        }
        Err(fallback) => Err(ParseError { primary, fallback }),
    }
}

// ---------------------------------------------------------------------------
// Fallback reader
// ---------------------------------------------------------------------------

/// Collect attribute names from `@attribute` lines: second whitespace token,
/// surrounding quotes stripped.
pub fn attribute_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| {
            l.get(..10)
                .is_some_and(|kw| kw.eq_ignore_ascii_case("@attribute"))
        })
        .filter_map(|l| l.split_whitespace().nth(1))
        .map(|name| name.trim_matches(|c| c == '\'' || c == '"').to_string())
        .collect()
}

/// Permissive reader: every non-blank line that is not a declaration (`@`)
/// or a comment (`%`) is a comma separated record.
///
/// If the attribute names found do not match the column count (or are not
/// unique) the columns are named `Col_1..Col_n` instead.
pub fn load_fallback(text: &str) -> Result<Table, FallbackError> {
    let data: String = text
        .lines()
        .filter(|l| {
            let t = l.trim_start();
            !t.is_empty() && !t.starts_with('@') && !t.starts_with('%')
        })
        .flat_map(|l| [l, "\n"])
        .collect();
    if data.is_empty() {
        return Err(FallbackError::NoData);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut width: Option<usize> = None;
    for (line_no, result) in reader.records().enumerate() {
        let record = result?;
        let expected = *width.get_or_insert(record.len());
        if record.len() > expected {
            return Err(FallbackError::TooManyFields {
                line: line_no + 1,
                expected,
                found: record.len(),
            });
        }
        let mut row: Vec<CellValue> = record
            .iter()
            .map(|field| match field {
                "" => CellValue::Missing,
                other => CellValue::from_raw(other),
            })
            .collect();
        row.resize(expected, CellValue::Missing);
        rows.push(row);
    }
    let Some(width) = width else {
        return Err(FallbackError::NoData);
    };

    let declared = attribute_names(text);
    let unique = declared.iter().collect::<HashSet<_>>().len() == declared.len();
    let names = if declared.len() == width && unique {
        declared
    } else {
        log::warn!(
            "found {} attribute names for {width} columns, naming columns positionally",
            declared.len()
        );
        (1..=width).map(|i| format!("Col_{i}")).collect()
    };

    Ok(Table::from_rows(names, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn utf8_is_decoded_directly() {
        assert_eq!(decode_bytes("protocolo ñ".as_bytes()), "protocolo ñ");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // "año" in Latin-1
        assert_eq!(decode_bytes(&[0x61, 0xF1, 0x6F]), "año");
    }

    #[test]
    fn strict_parse_is_preferred() {
        let table = load("@relation r\n@attribute a numeric\n@data\n1\n2\n").unwrap();
        assert_eq!(table.column_names(), vec!["a"]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn fallback_uses_declared_names_when_counts_match() {
        // Value outside the nominal set breaks the strict parser.
        let input = "@relation r\n@attribute proto {tcp}\n@attribute 'bytes' numeric\n@data\nudp,10\ntcp,?\n";
        let table = load(input).unwrap();
        assert_eq!(table.column_names(), vec!["proto", "bytes"]);
        assert_eq!(table.row(0), vec![&text("udp"), &text("10")]);
        assert_eq!(table.row(1), vec![&text("tcp"), &CellValue::Missing]);
    }

    #[test]
    fn fallback_names_columns_positionally_on_mismatch() {
        let input = "@attribute only\n% comment\n1,2,3\n4,5\n";
        let table = load(input).unwrap();
        assert_eq!(table.column_names(), vec!["Col_1", "Col_2", "Col_3"]);
        assert_eq!(table.row(1)[2], &CellValue::Missing);
    }

    #[test]
    fn fallback_rejects_wider_rows() {
        let err = load_fallback("1,2\n3,4,5\n").unwrap_err();
        assert!(matches!(
            err,
            FallbackError::TooManyFields {
                line: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn both_strategies_failing_is_a_parse_error() {
        let err = load("@relation r\n@attribute a numeric\n").unwrap_err();
        assert_eq!(err.primary, ArffError::MissingData);
        assert!(matches!(err.fallback, FallbackError::NoData));
        assert!(err.to_string().contains("no @data section"));
    }

    #[test]
    fn attribute_keyword_is_case_insensitive() {
        let names = attribute_names("@ATTRIBUTE \"Dur\" real\n  @Attribute svc string\n@data\n");
        assert_eq!(names, vec!["Dur", "svc"]);
    }
}
