//! Strict parser for the attribute-relation file format.
//!
//! ```text
//! % comment
//! @relation traffic
//! @attribute duration numeric
//! @attribute protocol_type {tcp, udp, icmp}
//! @attribute 'service name' string
//! @data
//! 0, tcp, http
//! {0 12, 1 udp}
//! ```
//!
//! Values are validated against their declared type but kept as text; the
//! type normalizer decides the final column types.

use std::collections::HashSet;

use thiserror::Error;

use super::model::{CellValue, Table, TableError, MISSING_TOKEN};

#[derive(Debug, Error, PartialEq)]
pub enum ArffError {
    #[error("no @relation declaration found")]
    MissingRelation,
    #[error("line {line}: @attribute appears before @relation")]
    AttributeBeforeRelation { line: usize },
    #[error("no @attribute declarations found")]
    NoAttributes,
    #[error("no @data section found")]
    MissingData,
    #[error("line {line}: malformed declaration '{text}'")]
    BadDeclaration { line: usize, text: String },
    #[error("line {line}: duplicate attribute '{name}'")]
    DuplicateAttribute { line: usize, name: String },
    #[error("line {line}: unsupported attribute type '{kind}'")]
    UnsupportedType { line: usize, kind: String },
    #[error("line {line}: unexpected content '{text}'")]
    UnexpectedContent { line: usize, text: String },
    #[error("line {line}: expected {expected} values, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: '{value}' is not numeric (attribute '{attribute}')")]
    InvalidNumeric {
        line: usize,
        attribute: String,
        value: String,
    },
    #[error("line {line}: '{value}' is not a declared value of '{attribute}'")]
    InvalidNominal {
        line: usize,
        attribute: String,
        value: String,
    },
    #[error("line {line}: bad sparse entry '{entry}'")]
    BadSparseEntry { line: usize, entry: String },
    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },
    #[error(transparent)]
    Table(#[from] TableError),
}

// ---------------------------------------------------------------------------
// Header model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// `numeric`, `real` and `integer`.
    Numeric,
    String,
    Date(Option<String>),
    Nominal(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

/// A parsed document before conversion into a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArffDocument {
    pub relation: String,
    pub attributes: Vec<Attribute>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ArffDocument {
    pub fn into_table(self) -> Result<Table, ArffError> {
        let names = self.attributes.into_iter().map(|a| a.name).collect();
        Ok(Table::from_rows(names, self.rows)?)
    }
}

/// Parse ARFF text into a raw table.
pub fn parse(text: &str) -> Result<Table, ArffError> {
    parse_document(text)?.into_table()
}

/// Parse ARFF text, keeping the relation name and attribute declarations.
pub fn parse_document(text: &str) -> Result<ArffDocument, ArffError> {
    let mut relation: Option<String> = None;
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut in_data = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        if in_data {
            if trimmed.starts_with('@') {
                return Err(ArffError::UnexpectedContent {
                    line,
                    text: trimmed.to_string(),
                });
            }
            rows.push(parse_row(trimmed, &attributes, line)?);
            continue;
        }

        let (keyword, rest) = split_keyword(trimmed);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" => {
                let mut scanner = Scanner::new(rest, line);
                let name = scanner.read_word()?;
                if name.text.is_empty() {
                    return Err(bad_declaration(line, trimmed));
                }
                relation = Some(name.text);
            }
            "@attribute" => {
                if relation.is_none() {
                    return Err(ArffError::AttributeBeforeRelation { line });
                }
                let attr = parse_attribute(rest, line)?;
                if !names.insert(attr.name.clone()) {
                    return Err(ArffError::DuplicateAttribute {
                        line,
                        name: attr.name,
                    });
                }
                attributes.push(attr);
            }
            "@data" => {
                if relation.is_none() {
                    return Err(ArffError::MissingRelation);
                }
                if attributes.is_empty() {
                    return Err(ArffError::NoAttributes);
                }
                in_data = true;
            }
            _ => {
                return Err(ArffError::UnexpectedContent {
                    line,
                    text: trimmed.to_string(),
                })
            }
        }
    }

    let Some(relation) = relation else {
        return Err(ArffError::MissingRelation);
    };
    if !in_data {
        return Err(ArffError::MissingData);
    }

    log::debug!(
        "parsed relation '{relation}': {} attributes, {} rows",
        attributes.len(),
        rows.len()
    );
    Ok(ArffDocument {
        relation,
        attributes,
        rows,
    })
}

fn bad_declaration(line: usize, text: &str) -> ArffError {
    ArffError::BadDeclaration {
        line,
        text: text.to_string(),
    }
}

/// Split `@keyword rest` at the first whitespace.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

fn parse_attribute(rest: &str, line: usize) -> Result<Attribute, ArffError> {
    let mut scanner = Scanner::new(rest, line);
    let name = scanner.read_word()?.text;
    let remainder = scanner.remainder();
    let type_spec = remainder.trim();
    if name.is_empty() || type_spec.is_empty() {
        return Err(bad_declaration(line, rest));
    }

    let kind = if let Some(inner) = type_spec.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| bad_declaration(line, rest))?;
        let values = split_fields(inner, line)?
            .into_iter()
            .map(|f| f.text)
            .collect();
        AttributeKind::Nominal(values)
    } else {
        let (word, format) = split_keyword(type_spec);
        match word.to_ascii_lowercase().as_str() {
            "numeric" | "real" | "integer" => AttributeKind::Numeric,
            "string" => AttributeKind::String,
            "date" => {
                let format = Some(format.trim_matches(|c| c == '\'' || c == '"'))
                    .filter(|f| !f.is_empty())
                    .map(str::to_string);
                AttributeKind::Date(format)
            }
            other => {
                return Err(ArffError::UnsupportedType {
                    line,
                    kind: other.to_string(),
                })
            }
        }
    };

    Ok(Attribute { name, kind })
}

// ---------------------------------------------------------------------------
// Data rows
// ---------------------------------------------------------------------------

fn parse_row(line_text: &str, attributes: &[Attribute], line: usize) -> Result<Vec<CellValue>, ArffError> {
    if let Some(inner) = line_text.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| ArffError::BadSparseEntry {
                line,
                entry: line_text.to_string(),
            })?;
        return parse_sparse_row(inner, attributes, line);
    }

    let fields = split_fields(line_text, line)?;
    if fields.len() != attributes.len() {
        return Err(ArffError::FieldCount {
            line,
            expected: attributes.len(),
            found: fields.len(),
        });
    }
    fields
        .into_iter()
        .zip(attributes)
        .map(|(field, attr)| validate(field, attr, line))
        .collect()
}

fn parse_sparse_row(inner: &str, attributes: &[Attribute], line: usize) -> Result<Vec<CellValue>, ArffError> {
    let mut row = vec![CellValue::Text("0".to_string()); attributes.len()];
    let mut scanner = Scanner::new(inner, line);
    scanner.skip_ws();
    while !scanner.at_end() {
        let index = scanner.read_word()?.text;
        let bad_entry = || ArffError::BadSparseEntry {
            line,
            entry: index.clone(),
        };
        let pos: usize = index.parse().map_err(|_| bad_entry())?;
        let attr = attributes.get(pos).ok_or_else(bad_entry)?;
        let field = scanner.read_value()?;
        row[pos] = validate(field, attr, line)?;
        scanner.expect_separator()?;
    }
    Ok(row)
}

fn validate(field: Field, attr: &Attribute, line: usize) -> Result<CellValue, ArffError> {
    if !field.quoted && field.text == MISSING_TOKEN {
        return Ok(CellValue::Missing);
    }
    match &attr.kind {
        AttributeKind::Numeric => {
            if field.text.parse::<f64>().is_err() {
                return Err(ArffError::InvalidNumeric {
                    line,
                    attribute: attr.name.clone(),
                    value: field.text,
                });
            }
        }
        AttributeKind::Nominal(allowed) => {
            if !allowed.contains(&field.text) {
                return Err(ArffError::InvalidNominal {
                    line,
                    attribute: attr.name.clone(),
                    value: field.text,
                });
            }
        }
        AttributeKind::String | AttributeKind::Date(_) => {}
    }
    Ok(CellValue::Text(field.text))
}

// ---------------------------------------------------------------------------
// Scanner – quote-aware tokenizer shared by header and data lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Field {
    text: String,
    quoted: bool,
}

/// Split a comma separated list, honouring `'` / `"` quoting.
fn split_fields(text: &str, line: usize) -> Result<Vec<Field>, ArffError> {
    let mut scanner = Scanner::new(text, line);
    let mut fields = Vec::new();
    loop {
        fields.push(scanner.read_value()?);
        if scanner.at_end() {
            break;
        }
        scanner.expect_separator()?;
    }
    Ok(fields)
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Scanner {
    fn new(text: &str, line: usize) -> Self {
        Scanner {
            chars: text.chars().collect(),
            pos: 0,
            line,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn remainder(&self) -> String {
        self.chars[self.pos.min(self.chars.len())..].iter().collect()
    }

    /// A quoted string, or a run of characters up to whitespace / `{`.
    fn read_word(&mut self) -> Result<Field, ArffError> {
        self.skip_ws();
        if let Some(q @ ('\'' | '"')) = self.peek() {
            return self.read_quoted(q);
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '{' && c != ',')
        {
            self.pos += 1;
        }
        Ok(Field {
            text: self.chars[start..self.pos].iter().collect(),
            quoted: false,
        })
    }

    /// A quoted string, or everything up to the next comma (trimmed).
    fn read_value(&mut self) -> Result<Field, ArffError> {
        self.skip_ws();
        if let Some(q @ ('\'' | '"')) = self.peek() {
            let field = self.read_quoted(q)?;
            self.skip_ws();
            return Ok(field);
        }
        let start = self.pos;
        while self.peek().is_some_and(|c| c != ',') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(Field {
            text: text.trim().to_string(),
            quoted: false,
        })
    }

    fn read_quoted(&mut self, quote: char) -> Result<Field, ArffError> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(ArffError::UnterminatedQuote { line: self.line }),
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self
                        .peek()
                        .ok_or(ArffError::UnterminatedQuote { line: self.line })?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    self.pos += 1;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Field { text, quoted: true });
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Consume a `,` separator, or accept end of input.
    fn expect_separator(&mut self) -> Result<(), ArffError> {
        self.skip_ws();
        match self.peek() {
            None => Ok(()),
            Some(',') => {
                self.pos += 1;
                self.skip_ws();
                Ok(())
            }
            Some(_) => Err(ArffError::UnexpectedContent {
                line: self.line,
                text: self.remainder(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
% network sample
@RELATION traffic

@attribute duration numeric
@attribute protocol_type {tcp, udp, icmp}
@attribute 'service name' string
@attribute when date \"yyyy-MM-dd\"

@data
0, tcp, http, 2024-01-01
12,udp,'domain u',?
?, icmp, 'eco_i', 2024-01-03
";

    #[test]
    fn parses_header_and_dense_rows() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.relation, "traffic");
        assert_eq!(doc.attributes.len(), 4);
        assert_eq!(doc.attributes[2].name, "service name");
        assert_eq!(
            doc.attributes[1].kind,
            AttributeKind::Nominal(vec!["tcp".into(), "udp".into(), "icmp".into()])
        );
        assert_eq!(doc.attributes[3].kind, AttributeKind::Date(Some("yyyy-MM-dd".into())));
        assert_eq!(doc.rows.len(), 3);
        assert_eq!(doc.rows[1][2], CellValue::Text("domain u".into()));
        assert_eq!(doc.rows[1][3], CellValue::Missing);
        assert_eq!(doc.rows[2][0], CellValue::Missing);
    }

    #[test]
    fn table_keeps_attribute_order() {
        let table = parse(SAMPLE).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["duration", "protocol_type", "service name", "when"]
        );
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn sparse_rows_default_to_zero() {
        let text = "@relation s\n@attribute a numeric\n@attribute b numeric\n@attribute c string\n@data\n{1 5, 2 'x y'}\n{}\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(
            doc.rows[0],
            vec![
                CellValue::Text("0".into()),
                CellValue::Text("5".into()),
                CellValue::Text("x y".into()),
            ]
        );
        assert_eq!(doc.rows[1][2], CellValue::Text("0".into()));
    }

    #[test]
    fn quoted_question_mark_is_text() {
        let text = "@relation s\n@attribute a string\n@data\n'?'\n?\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.rows[0][0], CellValue::Text("?".into()));
        assert_eq!(doc.rows[1][0], CellValue::Missing);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let text = "@relation s\n@attribute a numeric\n@attribute b numeric\n@data\n1,2,3\n";
        assert_eq!(
            parse(text).unwrap_err(),
            ArffError::FieldCount {
                line: 5,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_values_outside_declared_types() {
        let text = "@relation s\n@attribute a numeric\n@data\nabc\n";
        assert!(matches!(parse(text), Err(ArffError::InvalidNumeric { line: 4, .. })));

        let text = "@relation s\n@attribute p {tcp,udp}\n@data\nicmp\n";
        assert!(matches!(parse(text), Err(ArffError::InvalidNominal { .. })));
    }

    #[test]
    fn rejects_structural_problems() {
        assert_eq!(
            parse("@attribute a numeric\n@data\n1\n").unwrap_err(),
            ArffError::AttributeBeforeRelation { line: 1 }
        );
        assert_eq!(
            parse("@relation s\n@attribute a numeric\n1\n").unwrap_err(),
            ArffError::UnexpectedContent {
                line: 3,
                text: "1".into()
            }
        );
        assert_eq!(
            parse("@relation s\n@attribute a numeric\n").unwrap_err(),
            ArffError::MissingData
        );
        assert!(matches!(
            parse("@relation s\n@attribute a numeric\n@attribute a string\n@data\n"),
            Err(ArffError::DuplicateAttribute { line: 3, .. })
        ));
        assert!(matches!(
            parse("@relation s\n@attribute r relational\n@data\n"),
            Err(ArffError::UnsupportedType { .. })
        ));
        assert_eq!(
            parse("@relation s\n@attribute a string\n@data\n'open\n").unwrap_err(),
            ArffError::UnterminatedQuote { line: 4 }
        );
    }

    #[test]
    fn empty_data_section_gives_empty_table() {
        let table = parse("@relation s\n@attribute a numeric\n@data\n").unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 1);
    }
}
