//! Readers for raw expense batches
//!
//! Batches come either as JSON (a bare array of records, or an object with an
//! `expenses` array) or as CSV with a header row. Both vocabularies of the
//! expense form are understood: `category`/`expenseType` and
//! `counterparty`/`to`.
//!
//! Readers never judge the content of a record. Bad dates and amounts are
//! kept as-is and left for the aggregator to tally.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{parse_amount, ExpenseRecord};

/// Read a JSON batch
pub fn read_json<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let batch = match serde_json::from_reader(reader)? {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("expenses") {
            Some(expenses @ Value::Array(_)) => expenses,
            _ => {
                return Err(Error::Import(
                    "JSON object must contain an \"expenses\" array".into(),
                ))
            }
        },
        _ => {
            return Err(Error::Import(
                "JSON batch must be an array of expenses or an object with an \"expenses\" array"
                    .into(),
            ))
        }
    };

    let records: Vec<ExpenseRecord> = serde_json::from_value(batch)?;
    debug!("Read {} expense records from JSON", records.len());
    Ok(records)
}

/// Column positions resolved from a CSV header row
#[derive(Debug, Default)]
struct Columns {
    amount: Option<usize>,
    category: Option<usize>,
    subject: Option<usize>,
    counterparty: Option<usize>,
    date: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut columns = Columns::default();

        for (i, header) in headers.iter().enumerate() {
            let name = header.trim().to_lowercase().replace([' ', '_'], "");
            let slot = match name.as_str() {
                "amount" => &mut columns.amount,
                "category" | "expensetype" => &mut columns.category,
                "subject" | "description" => &mut columns.subject,
                "counterparty" | "to" | "payee" => &mut columns.counterparty,
                "date" => &mut columns.date,
                _ => continue,
            };
            slot.get_or_insert(i);
        }

        if columns.amount.is_none() || columns.date.is_none() {
            return Err(Error::Import(format!(
                "CSV header must include amount and date columns, got: {}",
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        Ok(columns)
    }
}

fn field(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column.and_then(|i| record.get(i)).map(str::trim)
}

/// Read a CSV batch with a header row
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result?;

        let category = field(&row, columns.category)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(ExpenseRecord {
            amount: field(&row, columns.amount).and_then(parse_amount),
            category,
            subject: field(&row, columns.subject).unwrap_or("").to_string(),
            counterparty: field(&row, columns.counterparty).unwrap_or("").to_string(),
            date: field(&row, columns.date).unwrap_or("").to_string(),
        });
    }

    debug!("Read {} expense records from CSV", records.len());
    Ok(records)
}

/// Read a batch from disk, choosing the format by file extension
pub fn read_path(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let file = File::open(path).map_err(|e| {
        Error::Import(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        read_csv(reader)
    } else {
        read_json(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_array() {
        let json = r#"[
            {"amount": 100, "category": "food", "subject": "Lunch", "counterparty": "Cafe", "date": "2024-01-10"},
            {"amount": "45.50", "expenseType": "transport", "to": "Uber", "date": "2024-01-12"}
        ]"#;

        let records = read_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, Some(100.0));
        assert_eq!(records[1].category_or_default(), "transport");
        assert_eq!(records[1].counterparty, "Uber");
        assert_eq!(records[1].subject, "");
    }

    #[test]
    fn test_read_json_wrapped() {
        let json = r#"{"expenses": [{"amount": 12, "date": "2024-02-01"}]}"#;
        let records = read_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_or_default(), "Other");
    }

    #[test]
    fn test_read_json_invalid() {
        assert!(matches!(
            read_json("{not json".as_bytes()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_read_json_loosely_typed_fields() {
        let json = r#"[
            {"amount": 100, "date": "2024-01-10"},
            {"amount": 50, "date": null},
            {"amount": 20, "date": 20240110, "subject": null, "to": null, "category": 7}
        ]"#;

        let records = read_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].date, "");
        assert_eq!(records[2].date, "20240110");
        assert_eq!(records[2].subject, "");
        assert_eq!(records[2].counterparty, "");
        assert_eq!(records[2].category.as_deref(), Some("7"));
    }

    #[test]
    fn test_read_json_wrong_shape() {
        let err = read_json(r#"{"items": []}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("expenses"));
        assert!(matches!(read_json("42".as_bytes()), Err(Error::Import(_))));
        assert!(matches!(read_json("[1, 2]".as_bytes()), Err(Error::Json(_))));
    }

    #[test]
    fn test_read_csv_both_vocabularies() {
        let csv = "Date,Amount,Expense Type,Subject,To\n\
                   2024-01-10,\"1,200.00\",Food,Dinner,Cafe\n\
                   15/01/2024,abc,,Taxi,Uber\n";
        let records = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, Some(1200.0));
        assert_eq!(records[0].category.as_deref(), Some("Food"));
        assert_eq!(records[0].counterparty, "Cafe");
        assert_eq!(records[1].amount, None);
        assert_eq!(records[1].category, None);
        assert_eq!(records[1].date, "15/01/2024");

        let csv = "amount,category,counterparty,date\n30,Bills,Power Co,2024-03-01\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].category_or_default(), "Bills");
        assert_eq!(records[0].counterparty, "Power Co");
    }

    #[test]
    fn test_read_csv_requires_amount_and_date() {
        let csv = "category,subject\nFood,Lunch\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_read_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("expenses.CSV");
        std::fs::write(&csv_path, "date,amount\n2024-01-01,5\n").unwrap();
        assert_eq!(read_path(&csv_path).unwrap().len(), 1);

        let json_path = dir.path().join("expenses.json");
        std::fs::write(&json_path, r#"[{"amount": 5, "date": "2024-01-01"}]"#).unwrap();
        assert_eq!(read_path(&json_path).unwrap().len(), 1);

        assert!(matches!(
            read_path(&dir.path().join("missing.json")),
            Err(Error::Import(_))
        ));
    }
}
