use crate::domain::verification::{DocumentVerification, VerificationStatus};
use crate::error::{AgencyError, Result};

/// Personal data types the intake flow accepts.
pub const SUPPORTED_PERSONAL_DATA_TYPES: [&str; 5] =
    ["FullName", "Passport", "Phone", "Email", "Other"];

/// Personal data types that must be approved before a contract activates.
pub const REQUIRED_PERSONAL_DATA_TYPES: [&str; 2] = ["FullName", "Passport"];

pub fn is_supported_type(document_type: Option<&str>) -> bool {
    matches_any(document_type, &SUPPORTED_PERSONAL_DATA_TYPES)
}

pub fn is_required_type(document_type: Option<&str>) -> bool {
    matches_any(document_type, &REQUIRED_PERSONAL_DATA_TYPES)
}

/// Case-insensitive type comparison; blank or missing types never match.
pub fn is_same_type(document_type: Option<&str>, expected_type: &str) -> bool {
    match document_type {
        Some(t) if !t.trim().is_empty() => t.eq_ignore_ascii_case(expected_type),
        _ => false,
    }
}

fn matches_any(document_type: Option<&str>, table: &[&str]) -> bool {
    table.iter().any(|t| is_same_type(document_type, t))
}

/// Required-type verifications still awaiting review.
pub fn pending_required(verifications: &[DocumentVerification]) -> Vec<String> {
    verifications
        .iter()
        .filter(|v| {
            is_required_type(v.document_type()) && v.status() == VerificationStatus::Pending
        })
        .map(|v| v.document_type().unwrap_or("unknown").to_string())
        .collect()
}

/// Required types with no approved verification at all.
pub fn missing_required(verifications: &[DocumentVerification]) -> Vec<String> {
    REQUIRED_PERSONAL_DATA_TYPES
        .iter()
        .filter(|required| {
            !verifications.iter().any(|v| {
                is_same_type(v.document_type(), required)
                    && v.status() == VerificationStatus::Approved
            })
        })
        .map(|required| required.to_string())
        .collect()
}

/// True when every required type has an approved verification. This is the
/// lighter gate used for auto-activation after payment.
pub fn mandatory_data_verified(verifications: &[DocumentVerification]) -> bool {
    missing_required(verifications).is_empty()
}

/// Full activation gate, applied in fixed order so the first failing check
/// determines the user-facing message:
/// 1. required types awaiting verification,
/// 2. required types with no approval,
/// 3. no approved document of any type.
pub fn check_activation(verifications: &[DocumentVerification]) -> Result<()> {
    let pending = pending_required(verifications);
    if !pending.is_empty() {
        return Err(AgencyError::Domain(format!(
            "Нельзя активировать договор: ожидает верификации обязательные данные ({})",
            pending.join(", ")
        )));
    }

    let missing = missing_required(verifications);
    if !missing.is_empty() {
        return Err(AgencyError::Domain(format!(
            "Нельзя активировать договор: нет одобренных обязательных данных ({})",
            missing.join(", ")
        )));
    }

    let any_approved = verifications
        .iter()
        .any(|v| v.status() == VerificationStatus::Approved);
    if !any_approved {
        return Err(AgencyError::Domain(
            "Нельзя активировать договор: нет одобренных документов клиента".to_string(),
        ));
    }

    Ok(())
}
