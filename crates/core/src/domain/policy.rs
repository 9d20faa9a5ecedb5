use std::fmt;

use serde::{Deserialize, Serialize};

/// One token paired with its checksum result. `policy_number` is the token
/// text exactly as extracted; leading zeroes are kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub policy_number: String,
    pub is_valid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Success { id: u64 },
    Failure { reason: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: AlertLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: AlertLevel::Error, message: message.into() }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationSummary {
    pub fn from_records(records: &[PolicyRecord]) -> Self {
        let valid = records.iter().filter(|record| record.is_valid).count();
        Self { total: records.len(), valid, invalid: records.len() - valid }
    }
}

#[cfg(test)]
mod tests {
    use super::{PolicyRecord, SubmissionOutcome, ValidationSummary};

    #[test]
    fn record_serializes_with_wire_field_names() {
        let record = PolicyRecord { policy_number: "012345678".to_owned(), is_valid: false };
        let json = serde_json::to_value(&record).expect("record serializes");

        assert_eq!(json["policyNumber"], "012345678");
        assert_eq!(json["isValid"], false);
    }

    #[test]
    fn summary_counts_valid_and_invalid_records() {
        let records = vec![
            PolicyRecord { policy_number: "345882865".to_owned(), is_valid: true },
            PolicyRecord { policy_number: "664371495".to_owned(), is_valid: false },
            PolicyRecord { policy_number: "457508000".to_owned(), is_valid: true },
        ];

        assert_eq!(
            ValidationSummary::from_records(&records),
            ValidationSummary { total: 3, valid: 2, invalid: 1 }
        );
        assert_eq!(ValidationSummary::from_records(&[]), ValidationSummary::default());
    }

    #[test]
    fn outcome_reports_success_flag() {
        assert!(SubmissionOutcome::Success { id: 101 }.is_success());
        assert!(!SubmissionOutcome::Failure { reason: "nope".to_owned() }.is_success());
    }
}
