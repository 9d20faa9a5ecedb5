//! Policy-number extraction from CSV text, plus the checks applied to an
//! upload before its contents are read.
//!
//! This is not a CSV parser: there is no quoting, no header
//! detection and no column schema. Every comma-separated field on every line
//! is a candidate, and only all-digit fields survive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
pub const CSV_MEDIA_TYPE: &str = "text/csv";

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;
const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// A leading byte order mark is ignored and counts as whitespace when
/// trimming fields.
pub fn parse_policy_numbers_from_csv(content: &str) -> Vec<String> {
    content
        .strip_prefix(BYTE_ORDER_MARK)
        .unwrap_or(content)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .flat_map(|line| line.split(','))
        .map(trim_field)
        .filter(|field| is_numeric_token(field))
        .map(str::to_owned)
        .collect()
}

fn trim_field(field: &str) -> &str {
    field.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
}

fn is_numeric_token(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

/// What is known about an upload before reading it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub media_type: Option<String>,
    pub size_bytes: u64,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, size_bytes: u64) -> Self {
        Self { name: name.into(), media_type, size_bytes }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadRejection {
    #[error("`{name}` is not a CSV file")]
    NotCsv { name: String },
    #[error("`{name}` is {size_bytes} bytes, limit is {limit_bytes}")]
    TooLarge { name: String, size_bytes: u64, limit_bytes: u64 },
}

impl UploadRejection {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotCsv { .. } => "Please upload a valid CSV file.".to_owned(),
            Self::TooLarge { limit_bytes, .. } => {
                format!("CSV file must be {} or smaller.", format_megabytes(*limit_bytes))
            }
        }
    }
}

/// Some clients send no media type, so the file extension is the fallback.
pub fn is_csv_file(file: &UploadFile) -> bool {
    let by_media_type = file
        .media_type
        .as_deref()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case(CSV_MEDIA_TYPE))
        .unwrap_or(false);

    by_media_type || file.name.to_ascii_lowercase().ends_with(".csv")
}

pub fn is_within_max_file_size(file: &UploadFile) -> bool {
    is_within_file_size(file, MAX_FILE_SIZE_BYTES)
}

pub fn is_within_file_size(file: &UploadFile, limit_bytes: u64) -> bool {
    file.size_bytes <= limit_bytes
}

pub fn screen_upload(file: &UploadFile, limit_bytes: u64) -> Result<(), UploadRejection> {
    if !is_csv_file(file) {
        return Err(UploadRejection::NotCsv { name: file.name.clone() });
    }

    if !is_within_file_size(file, limit_bytes) {
        return Err(UploadRejection::TooLarge {
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            limit_bytes,
        });
    }

    Ok(())
}

fn format_megabytes(bytes: u64) -> String {
    if bytes % BYTES_PER_MEGABYTE == 0 {
        format!("{} MB", bytes / BYTES_PER_MEGABYTE)
    } else {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MEGABYTE as f64)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{
        is_csv_file, is_within_max_file_size, parse_policy_numbers_from_csv, screen_upload,
        UploadFile, UploadRejection, MAX_FILE_SIZE_BYTES,
    };

    fn file(name: &str, media_type: &str, size_bytes: u64) -> UploadFile {
        let media_type = (!media_type.is_empty()).then(|| media_type.to_owned());
        UploadFile::new(name, media_type, size_bytes)
    }

    #[test]
    fn parses_only_digit_tokens_in_order() {
        let csv = "345882865,664371495\nhello,457508000\n";
        assert_eq!(
            parse_policy_numbers_from_csv(csv),
            vec!["345882865", "664371495", "457508000"]
        );
    }

    #[test]
    fn crlf_line_endings_leave_no_carriage_return() {
        let csv = "345882865\r\n664371495\r\n";
        assert_eq!(parse_policy_numbers_from_csv(csv), vec!["345882865", "664371495"]);
    }

    #[test]
    fn fields_are_trimmed_and_any_digit_length_is_kept() {
        let csv = "  012 , 1234567890 ,\t7\n\n,,\n12a,  ,-5,3.0";
        assert_eq!(parse_policy_numbers_from_csv(csv), vec!["012", "1234567890", "7"]);
    }

    #[test]
    fn byte_order_mark_does_not_hide_first_number() {
        let csv = "\u{FEFF}345882865,664371495\n457508000\n";
        assert_eq!(
            parse_policy_numbers_from_csv(csv),
            vec!["345882865", "664371495", "457508000"]
        );
        assert_eq!(
            parse_policy_numbers_from_csv("012,\u{FEFF}345882865\u{FEFF}"),
            vec!["012", "345882865"]
        );
    }

    #[test]
    fn empty_or_non_numeric_content_yields_nothing() {
        assert!(parse_policy_numbers_from_csv("").is_empty());
        assert!(parse_policy_numbers_from_csv("policy,number\nfoo,bar\r\n").is_empty());
    }

    #[test]
    fn accepts_csv_media_type() {
        assert!(is_csv_file(&file("policies.csv", "text/csv", 3)));
        assert!(is_csv_file(&file("upload.bin", "TEXT/CSV", 3)));
    }

    #[test]
    fn accepts_csv_extension_when_media_type_is_empty() {
        assert!(is_csv_file(&file("policies.csv", "", 3)));
        assert!(is_csv_file(&file("POLICIES.CSV", "", 3)));
    }

    #[test]
    fn rejects_non_csv_file() {
        assert!(!is_csv_file(&file("policies.json", "application/json", 2)));
    }

    #[test]
    fn enforces_two_megabyte_limit() {
        assert!(is_within_max_file_size(&file("policies.csv", "text/csv", MAX_FILE_SIZE_BYTES)));
        assert!(!is_within_max_file_size(&file(
            "policies.csv",
            "text/csv",
            MAX_FILE_SIZE_BYTES + 1
        )));
    }

    #[test]
    fn screening_reports_user_messages() {
        let not_csv = screen_upload(&file("policies.json", "application/json", 2), MAX_FILE_SIZE_BYTES)
            .expect_err("json upload should be rejected");
        assert!(matches!(not_csv, UploadRejection::NotCsv { .. }));
        assert_eq!(not_csv.user_message(), "Please upload a valid CSV file.");

        let too_large =
            screen_upload(&file("policies.csv", "text/csv", MAX_FILE_SIZE_BYTES + 1), MAX_FILE_SIZE_BYTES)
                .expect_err("oversized upload should be rejected");
        assert_eq!(too_large.user_message(), "CSV file must be 2 MB or smaller.");

        let custom = screen_upload(&file("policies.csv", "", 600_000), 524_288)
            .expect_err("custom limit should apply");
        assert_eq!(custom.user_message(), "CSV file must be 0.5 MB or smaller.");

        assert!(screen_upload(&file("policies.csv", "", 10), MAX_FILE_SIZE_BYTES).is_ok());
    }

    proptest! {
        #[test]
        fn digit_only_csv_round_trips(
            rows in prop::collection::vec(prop::collection::vec("[0-9]{1,12}", 1..5), 0..8),
            crlf in any::<bool>(),
        ) {
            let newline = if crlf { "\r\n" } else { "\n" };
            let content = rows
                .iter()
                .map(|row| row.join(","))
                .collect::<Vec<_>>()
                .join(newline);
            let expected: Vec<String> = rows.into_iter().flatten().collect();

            prop_assert_eq!(parse_policy_numbers_from_csv(&content), expected);
        }
    }
}
