//! # Invoice Model
//!
//! Billing record associated with a booking for a single evaluation.

use super::{parse_calendar_date, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Payment state of an invoice. Unknown values are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    Paid,
    Completed,
    #[default]
    Pending,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Other(raw) => raw,
        }
    }

    /// Paid and completed invoices both count as settled
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Completed)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for InvoiceStatus {
    fn from(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            "completed" => Self::Completed,
            "pending" => Self::Pending,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for InvoiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InvoiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, alias = "dueDate", deserialize_with = "super::lenient_date")]
    pub due_date: Option<String>,
}

impl Invoice {
    pub fn new(id: impl Into<RecordId>, status: InvoiceStatus, due_date: Option<String>) -> Self {
        Self {
            id: id.into(),
            status,
            due_date,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status.is_settled()
    }

    /// Parsed due date, `None` when missing or malformed
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_calendar_date)
    }

    /// Whether the due date lies strictly before `today`.
    ///
    /// Payment state is not considered here; a late payment does not make a
    /// past due date "not overdue" retroactively.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due().is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invoice_status_parsing() {
        assert_eq!(InvoiceStatus::from("paid"), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::from("completed"), InvoiceStatus::Completed);
        assert_eq!(
            InvoiceStatus::from("refunded"),
            InvoiceStatus::Other("refunded".to_string())
        );
        assert!(InvoiceStatus::Paid.is_settled());
        assert!(InvoiceStatus::Completed.is_settled());
        assert!(!InvoiceStatus::Pending.is_settled());
        assert!(!InvoiceStatus::Other("partial".to_string()).is_settled());
    }

    #[test]
    fn test_invoice_decodes_both_spellings() {
        let camel: Invoice =
            serde_json::from_value(json!({"id": 1, "status": "pending", "dueDate": "2024-05-01"}))
                .unwrap();
        let snake: Invoice =
            serde_json::from_value(json!({"id": 1, "status": "pending", "due_date": "2024-05-01"}))
                .unwrap();
        assert_eq!(camel, snake);
    }

    #[test]
    fn test_past_due_is_strict() {
        let invoice = Invoice::new("inv-1", InvoiceStatus::Pending, Some("2024-05-01".into()));
        let due = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert!(!invoice.is_past_due(due));
        assert!(invoice.is_past_due(due.succ_opt().unwrap()));
        assert!(!invoice.is_past_due(due.pred_opt().unwrap()));
    }

    #[test]
    fn test_missing_due_date_is_never_past_due() {
        let invoice = Invoice::new("inv-2", InvoiceStatus::Pending, None);
        assert!(!invoice.is_past_due(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}
