use super::model::{CellValue, Column, Table};

/// Coerce every column that is fully numeric into numeric cells.
///
/// A column becomes `Integer` when every non-missing cell parses as `i64`,
/// `Float` when every non-missing cell parses as `f64`, and is left as it
/// was otherwise. Missing cells (and blank text) stay missing. Never fails.
pub fn normalize(table: &Table) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|col| match coerce_column(&col.values) {
            Some(values) => Column::new(col.name.clone(), values),
            None => {
                log::debug!("column '{}' kept as text", col.name);
                col.clone()
            }
        })
        .collect();
    Table::with_columns(columns)
}

/// Numeric view of one cell, or `None` if it has none.
enum Numeric {
    Missing,
    Int(i64),
    Float(f64),
}

fn classify(cell: &CellValue) -> Option<Numeric> {
    match cell {
        CellValue::Missing => Some(Numeric::Missing),
        CellValue::Integer(i) => Some(Numeric::Int(*i)),
        CellValue::Float(f) => Some(Numeric::Float(*f)),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(Numeric::Missing)
            } else if let Ok(i) = s.parse::<i64>() {
                Some(Numeric::Int(i))
            } else {
                s.parse::<f64>().ok().map(Numeric::Float)
            }
        }
    }
}

fn coerce_column(values: &[CellValue]) -> Option<Vec<CellValue>> {
    let parsed: Vec<Numeric> = values.iter().map(classify).collect::<Option<_>>()?;
    let any_float = parsed.iter().any(|n| matches!(n, Numeric::Float(_)));

    Some(
        parsed
            .into_iter()
            .map(|n| match n {
                Numeric::Missing => CellValue::Missing,
                Numeric::Int(i) if any_float => CellValue::Float(i as f64),
                Numeric::Int(i) => CellValue::Integer(i),
                Numeric::Float(f) => CellValue::Float(f),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from_raw(v)).collect())
    }

    #[test]
    fn integer_column_keeps_missing_sentinel() {
        let table = Table::new(vec![text_column("n", &["1", "2", "?", "4"])]).unwrap();
        let out = normalize(&table);
        assert_eq!(
            out.columns()[0].values,
            vec![
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::Missing,
                CellValue::Integer(4),
            ]
        );
    }

    #[test]
    fn text_column_is_untouched() {
        let table = Table::new(vec![text_column("s", &["a", "b", "c"])]).unwrap();
        assert_eq!(normalize(&table), table);
    }

    #[test]
    fn mixed_column_is_untouched() {
        let table = Table::new(vec![text_column("m", &["1", "x", "3"])]).unwrap();
        assert_eq!(normalize(&table), table);
    }

    #[test]
    fn any_float_promotes_whole_column() {
        let table = Table::new(vec![text_column("f", &["1", "2.5", "-3e2"])]).unwrap();
        let out = normalize(&table);
        assert_eq!(
            out.columns()[0].values,
            vec![
                CellValue::Float(1.0),
                CellValue::Float(2.5),
                CellValue::Float(-300.0),
            ]
        );
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let table = Table::new(vec![
            text_column("n", &["1", "?", "3"]),
            text_column("f", &["0.5", "1", "?"]),
            text_column("s", &["tcp", "udp", "?"]),
        ])
        .unwrap();
        let once = normalize(&table);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn columns_are_independent() {
        let table = Table::new(vec![
            text_column("n", &["10", "20"]),
            text_column("s", &["tcp", "5"]),
        ])
        .unwrap();
        let out = normalize(&table);
        assert_eq!(out.columns()[0].values[0], CellValue::Integer(10));
        assert_eq!(out.columns()[1].values[1], CellValue::Text("5".into()));
    }
}
