use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::model::CellValue;

/// One bar of a category-frequency chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub label: String,
    pub count: usize,
}

impl Bin {
    fn new(label: impl Into<String>, count: usize) -> Self {
        Bin {
            label: label.into(),
            count,
        }
    }
}

/// Count cells by their textual value (missing cells count as `?`).
///
/// With no `display_order` the bins come in descending-frequency order, ties
/// in first-appearance order. With a `display_order`, the labels it lists
/// that occur in the data come first in that order, followed by the rest in
/// descending-frequency order.
pub fn histogram(values: &[CellValue], display_order: Option<&[String]>) -> Vec<Bin> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for cell in values {
        let label = cell.to_string();
        let count = counts.entry(label).or_insert_with_key(|l| {
            first_seen.push(l.clone());
            0
        });
        *count += 1;
    }

    let mut by_frequency: Vec<Bin> = first_seen
        .into_iter()
        .map(|label| {
            let count = counts[&label];
            Bin::new(label, count)
        })
        .collect();
    // Stable sort keeps first-appearance order among equal counts.
    by_frequency.sort_by(|a, b| b.count.cmp(&a.count));

    let Some(order) = display_order else {
        return by_frequency;
    };

    // A label listed twice in the order is emitted once.
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<Bin> = order
        .iter()
        .filter(|label| emitted.insert(label.as_str()))
        .filter_map(|label| counts.get(label).map(|&count| Bin::new(label.clone(), count)))
        .collect();
    ordered.extend(
        by_frequency
            .into_iter()
            .filter(|bin| !order.contains(&bin.label)),
    );
    ordered
}

/// Canonical bar order for the protocol chart.
///
/// Returns `preferred` restricted to labels present in `values`, but only
/// when `anchor` itself is present; otherwise `None` (natural order).
pub fn preferred_order(values: &[CellValue], preferred: &[String], anchor: &str) -> Option<Vec<String>> {
    let present: Vec<String> = values.iter().map(CellValue::to_string).collect();
    if !present.iter().any(|v| v == anchor) {
        return None;
    }
    Some(
        preferred
            .iter()
            .filter(|p| present.contains(*p))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(labels: &[&str]) -> Vec<CellValue> {
        labels.iter().map(|l| CellValue::from_raw(l)).collect()
    }

    fn order(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn natural_order_is_descending_frequency() {
        let values = cells(&["udp", "tcp", "tcp", "icmp", "tcp", "udp"]);
        let bins = histogram(&values, None);
        assert_eq!(
            bins,
            vec![Bin::new("tcp", 3), Bin::new("udp", 2), Bin::new("icmp", 1)]
        );
    }

    #[test]
    fn ties_keep_first_appearance() {
        let bins = histogram(&cells(&["b", "a", "a", "b", "c"]), None);
        assert_eq!(bins, vec![Bin::new("b", 2), Bin::new("a", 2), Bin::new("c", 1)]);
    }

    #[test]
    fn display_order_then_remaining_by_frequency() {
        let values = cells(&["tcp", "tcp", "tcp", "udp", "icmp", "other", "other"]);
        let bins = histogram(&values, Some(order(&["udp", "tcp", "absent"]).as_slice()));
        assert_eq!(
            bins,
            vec![
                Bin::new("udp", 1),
                Bin::new("tcp", 3),
                Bin::new("other", 2),
                Bin::new("icmp", 1),
            ]
        );
    }

    #[test]
    fn totals_match_row_count_for_any_order() {
        let values = cells(&["tcp", "?", "udp", "tcp", "?"]);
        for ord in [None, Some(order(&["udp"])), Some(order(&["x", "tcp", "?"]))] {
            let bins = histogram(&values, ord.as_deref());
            assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        }
    }

    #[test]
    fn repeated_order_labels_are_emitted_once() {
        let values = cells(&["tcp", "udp"]);
        let bins = histogram(&values, Some(order(&["tcp", "tcp"]).as_slice()));
        assert_eq!(bins, vec![Bin::new("tcp", 1), Bin::new("udp", 1)]);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    }

    #[test]
    fn missing_cells_count_under_marker() {
        let bins = histogram(&[CellValue::Missing, CellValue::Integer(3)], None);
        assert_eq!(bins, vec![Bin::new("?", 1), Bin::new("3", 1)]);
    }

    #[test]
    fn empty_column_yields_no_bins() {
        assert!(histogram(&[], None).is_empty());
        assert!(histogram(&[], Some(order(&["tcp"]).as_slice())).is_empty());
    }

    #[test]
    fn preferred_order_requires_anchor() {
        let preferred = order(&["udp", "tcp", "icmp"]);
        assert_eq!(
            preferred_order(&cells(&["icmp", "tcp"]), &preferred, "tcp"),
            Some(order(&["tcp", "icmp"]))
        );
        assert_eq!(preferred_order(&cells(&["icmp", "udp"]), &preferred, "tcp"), None);
    }
}
