//! Running inventory summary: item count, total quantity, total value

use serde::Serialize;
use crate::record::{GridRow, Record};

/// Totals over the rows currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub items: usize,
    pub total_qty: i64,
    pub total_value: f64,
}

impl Summary {
    /// Summarise `(qty, price)` pairs; a missing value counts as zero.
    ///
    /// Totals saturate at the largest representable value instead of overflowing.
    pub fn compute<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<i64>, Option<f64>)>,
    {
        rows.into_iter().fold(Self::default(), |mut acc, (qty, price)| {
            let qty = qty.unwrap_or(0);
            acc.items += 1;
            acc.total_qty = acc.total_qty.saturating_add(qty);
            acc.total_value = (acc.total_value + qty as f64 * price.unwrap_or(0.0)).min(f64::MAX);
            acc
        })
    }

    pub fn from_records(records: &[Record]) -> Self {
        Self::compute(records.iter().map(|r| (Some(r.qty), Some(r.price))))
    }

    pub fn from_rows(rows: &[GridRow]) -> Self {
        Self::compute(rows.iter().map(|r| (r.qty, r.price)))
    }

    /// Total value rounded to cents for display
    pub fn display_value(&self) -> f64 {
        (self.total_value * 100.0).round() / 100.0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Items: {}", self.items)?;
        writeln!(f, "Total quantity: {}", self.total_qty)?;
        write!(f, "Stock value: {:.2}", self.total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_seed_data() {
        let records = vec![
            Record { id: 1, name: "사과".into(), qty: 10, price: 1.2, note: None },
            Record { id: 2, name: "바나나".into(), qty: 6, price: 0.8, note: None },
            Record { id: 3, name: "배".into(), qty: 4, price: 2.0, note: None },
        ];

        let summary = Summary::from_records(&records);
        assert_eq!(summary.items, 3);
        assert_eq!(summary.total_qty, 20);
        assert_eq!(summary.display_value(), 24.8);
        assert!(summary.to_string().ends_with("Stock value: 24.80"));
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let summary = Summary::compute(vec![(None, Some(5.0)), (Some(3), None), (Some(2), Some(1.5))]);
        assert_eq!(summary.items, 3);
        assert_eq!(summary.total_qty, 5);
        assert_eq!(summary.total_value, 3.0);
    }

    #[test]
    fn test_totals_saturate_on_huge_rows() {
        let huge = Record { id: 1, name: "볼트".into(), qty: 5_000_000_000_000_000_000, price: 1e300, note: None };
        let records = vec![huge.clone(), Record { id: 2, ..huge }];

        let summary = Summary::from_records(&records);
        assert_eq!(summary.total_qty, i64::MAX);
        assert_eq!(summary.total_value, f64::MAX);

        let json = serde_json::to_value(summary).unwrap();
        assert!(json["total_value"].is_number());
    }

    #[test]
    fn test_empty() {
        let summary = Summary::from_rows(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.to_string(), "Items: 0\nTotal quantity: 0\nStock value: 0.00");
    }
}
