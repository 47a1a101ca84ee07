//! Projects raw tickets onto the fixed display schema.

use crate::walker::RawTicket;

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Rendered in place of absent or null values.
pub const NONE_TEXT: &str = "None";

pub const ID_COLUMN: &str = "id";

/// Data columns in display order. `id` is the row key, not a column.
pub const COLUMNS: [&str; 6] = [
    "subject",
    "priority",
    "status",
    "submitter_id",
    "assignee_id",
    "organization_id",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("ticket at position {position} has no usable id")]
    InvalidId { position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub id: u64,
    pub subject: String,
    pub priority: String,
    pub status: String,
    pub submitter_id: String,
    pub assignee_id: String,
    pub organization_id: String,
}

impl TicketRow {
    pub fn from_raw(record: &RawTicket) -> Option<Self> {
        let id = record.get(ID_COLUMN).and_then(id_value)?;
        Some(TicketRow {
            id,
            subject: text_field(record, "subject"),
            priority: text_field(record, "priority"),
            status: text_field(record, "status"),
            submitter_id: integer_field(record, "submitter_id"),
            assignee_id: integer_field(record, "assignee_id"),
            organization_id: integer_field(record, "organization_id"),
        })
    }

    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            self.subject.as_str(),
            self.priority.as_str(),
            self.status.as_str(),
            self.submitter_id.as_str(),
            self.assignee_id.as_str(),
            self.organization_id.as_str(),
        ]
    }
}

/// Rows keyed by ticket id, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketTable {
    rows: Vec<TicketRow>,
}

impl TicketTable {
    pub fn rows(&self) -> &[TicketRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TicketRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

/// Ids are unique in the table: a ticket seen again later in the walk is
/// dropped and the first occurrence kept.
pub fn normalize(records: &[RawTicket]) -> Result<TicketTable, NormalizeError> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let row = TicketRow::from_raw(record).ok_or(NormalizeError::InvalidId { position })?;
        if !seen.insert(row.id) {
            tracing::warn!("Dropping duplicate ticket {} at position {position}", row.id);
            continue;
        }
        rows.push(row);
    }
    tracing::debug!("Normalized {} tickets", rows.len());
    Ok(TicketTable { rows })
}

fn id_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text coercion for free-form fields.
pub fn text_field(record: &RawTicket, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => NONE_TEXT.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Text coercion for id-like fields: integral floats lose their fraction.
pub fn integer_field(record: &RawTicket, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => NONE_TEXT.to_string(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
                    _ => n.to_string(),
                }
            }
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTicket {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn full_ticket(id: u64) -> RawTicket {
        raw(json!({
            "id": id,
            "subject": format!("Subject {id}"),
            "description": "long text",
            "priority": "high",
            "status": "open",
            "submitter_id": 1000 + id,
            "assignee_id": 2000 + id,
            "organization_id": 3000 + id,
            "tags": ["extra"],
            "url": "https://acme.zendesk.com/api/v2/tickets/1.json"
        }))
    }

    #[test]
    fn ten_records_make_ten_rows_of_six_columns() {
        let records: Vec<_> = (1..=10).map(full_ticket).collect();
        let table = normalize(&records).unwrap();
        assert_eq!(table.len(), 10);
        for row in table.rows() {
            assert_eq!(row.cells().len(), COLUMNS.len());
            assert_eq!(COLUMNS.len(), 6);
        }
    }

    #[test]
    fn projection_keeps_values_and_drops_extras() {
        let table = normalize(&[full_ticket(7)]).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.id, 7);
        assert_eq!(
            row.cells(),
            ["Subject 7", "high", "open", "1007", "2007", "3007"]
        );
    }

    #[test]
    fn missing_priority_becomes_none_text() {
        let mut record = full_ticket(1);
        record.remove("priority");
        let table = normalize(&[record]).unwrap();
        assert_eq!(table.rows()[0].priority, "None");
    }

    #[test]
    fn null_and_missing_ids_become_none_text() {
        let record = raw(json!({
            "id": 3,
            "subject": null,
            "status": "new",
            "submitter_id": 42,
            "assignee_id": null
        }));
        let table = normalize(&[record]).unwrap();
        assert_eq!(
            table.rows()[0].cells(),
            ["None", "None", "new", "42", "None", "None"]
        );
    }

    #[test]
    fn integral_floats_lose_their_fraction() {
        let record = raw(json!({ "id": 4.0, "submitter_id": 361089721035.0, "assignee_id": 1.5 }));
        let table = normalize(&[record]).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.id, 4);
        assert_eq!(row.submitter_id, "361089721035");
        assert_eq!(row.assignee_id, "1.5");
    }

    #[test]
    fn non_string_text_is_coerced() {
        let record = raw(json!({ "id": 1, "subject": 12, "status": true }));
        let table = normalize(&[record]).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.subject, "12");
        assert_eq!(row.status, "true");
    }

    #[test]
    fn order_is_preserved_not_sorted() {
        let records = vec![full_ticket(9), full_ticket(2), full_ticket(5)];
        let table = normalize(&records).unwrap();
        let ids: Vec<_> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
        assert_eq!(table.get(2).map(|r| r.subject.as_str()), Some("Subject 2"));
    }

    #[test]
    fn record_without_id_is_rejected() {
        let records = vec![full_ticket(1), raw(json!({ "subject": "orphan" }))];
        assert_eq!(
            normalize(&records).unwrap_err(),
            NormalizeError::InvalidId { position: 1 }
        );
    }

    #[test]
    fn duplicate_ids_keep_the_first_row() {
        let mut moved = full_ticket(2);
        moved.insert("subject".to_string(), json!("seen again"));
        let records = vec![full_ticket(1), full_ticket(2), full_ticket(3), moved];

        let table = normalize(&records).unwrap();
        let ids: Vec<_> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(table.get(2).unwrap().subject, "Subject 2");
    }

    #[test]
    fn empty_input_makes_empty_table() {
        assert!(normalize(&[]).unwrap().is_empty());
    }
}
