use tabled::{settings::Style, Table, Tabled};
use crate::record::Record;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One inventory line as shown by `list`, with its snapshot position
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Qty")]
    qty: i64,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Note")]
    note: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render a snapshot; the `Row` column is the position edits refer to
pub fn records_table(records: &[Record]) -> String {
    let rows: Vec<RecordRow> = records
        .iter()
        .enumerate()
        .map(|(row, record)| RecordRow {
            row,
            id: record.id,
            name: record.name.clone(),
            qty: record.qty,
            price: format!("{:.2}", record.price),
            note: record.note.clone().unwrap_or_default(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_table_shows_positions() {
        let records = vec![Record {
            id: 7,
            name: "사과".into(),
            qty: 10,
            price: 1.2,
            note: None,
        }];

        let table = records_table(&records);
        assert!(table.contains("Row"));
        assert!(table.contains("사과"));
        assert!(table.contains("1.20"));
    }

    #[test]
    fn test_empty_stats_table() {
        assert!(stats_table(&[]).is_empty());
        assert!(stats_table(&[("Items", "3")]).contains("Items"));
    }
}
