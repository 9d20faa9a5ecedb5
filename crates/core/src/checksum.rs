use serde::{Deserialize, Serialize};

use crate::domain::policy::PolicyRecord;

pub const POLICY_NUMBER_LENGTH: usize = 9;
pub const CHECKSUM_MODULUS: u32 = 11;

/// Finer-grained result than [`is_valid_policy_number`]; separates a wrong
/// shape from a well-formed number whose checksum does not hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCheck {
    Valid,
    ChecksumFailed,
    Malformed,
}

impl PolicyCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::ChecksumFailed => "checksum_failed",
            Self::Malformed => "malformed",
        }
    }
}

pub fn diagnose_policy_number(candidate: &str) -> PolicyCheck {
    if candidate.len() != POLICY_NUMBER_LENGTH || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return PolicyCheck::Malformed;
    }

    // Weight 1 lands on the rightmost digit, weight 9 on the leftmost.
    let sum: u32 = candidate
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| u32::from(byte - b'0') * (index as u32 + 1))
        .sum();

    if sum % CHECKSUM_MODULUS == 0 {
        PolicyCheck::Valid
    } else {
        PolicyCheck::ChecksumFailed
    }
}

pub fn is_valid_policy_number(candidate: &str) -> bool {
    diagnose_policy_number(candidate) == PolicyCheck::Valid
}

pub fn get_policy_validation(candidate: &str) -> PolicyRecord {
    PolicyRecord {
        policy_number: candidate.to_owned(),
        is_valid: is_valid_policy_number(candidate),
    }
}
