//! Classification of failed upstream writes into field-level validation errors.
//!
//! When a create or update is rejected with a structured error body, the
//! bridge host gets a `400` naming the offending field instead of an opaque
//! upstream failure.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message logged when a failure cannot be mapped to a field.
const UNMAPPED: &str = "Could not map error, please check the shop system logs.";

/// Field of the bridge payload an upstream rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorField {
    Label,
    Path,
    Unknown,
}

/// Why the field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCause {
    MustBeUnique,
    Unknown,
}

/// Machine-readable error code understood by the bridge host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FieldMustBeUnique,
    Unknown,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: ErrorField,
    pub cause: ErrorCause,
    pub code: ErrorCode,
}

/// A write rejected for field-level reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid field in body")]
pub struct FieldValidationError {
    pub causes: Vec<FieldError>,
}

/// Decides whether a failed upstream write is a field validation failure.
pub trait WriteFailureClassifier: Send + Sync {
    /// Inspect a failed call.
    ///
    /// `payload` is the upstream error body, if there was one.
    ///
    /// # Errors
    ///
    /// Returns the validation error when the failure maps to caller input;
    /// `Ok(())` means the failure is not a validation problem.
    fn classify(&self, method: &Method, payload: Option<&Value>) -> Result<(), FieldValidationError>;
}

/// Classifier reading the human-readable `detail` of upstream error bodies.
///
/// Only POST and PUT failures with an object or array body are classified.
/// The field is inferred from the words `Name` (label) and `Url` (path); a
/// detail containing `must be unique` yields `FIELD_MUST_BE_UNIQUE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetailHeuristic;

impl DetailHeuristic {
    fn field(detail: Option<&str>) -> ErrorField {
        match detail {
            Some(d) if d.contains("Name") => ErrorField::Label,
            Some(d) if d.contains("Url") => ErrorField::Path,
            _ => ErrorField::Unknown,
        }
    }

    fn cause(detail: Option<&str>) -> ErrorCause {
        match detail {
            Some(d) if d.contains("must be unique") => ErrorCause::MustBeUnique,
            _ => ErrorCause::Unknown,
        }
    }

    fn code(field: ErrorField, cause: ErrorCause) -> ErrorCode {
        match (field, cause) {
            (ErrorField::Label | ErrorField::Path, ErrorCause::MustBeUnique) => {
                ErrorCode::FieldMustBeUnique
            }
            _ => ErrorCode::Unknown,
        }
    }
}

impl WriteFailureClassifier for DetailHeuristic {
    fn classify(&self, method: &Method, payload: Option<&Value>) -> Result<(), FieldValidationError> {
        if *method != Method::POST && *method != Method::PUT {
            tracing::debug!("{UNMAPPED}");
            return Ok(());
        }

        let Some(payload) = payload.filter(|p| p.is_object() || p.is_array()) else {
            tracing::debug!("{UNMAPPED}");
            return Ok(());
        };

        let detail = payload.get("detail").and_then(Value::as_str);
        let field = Self::field(detail);
        let cause = Self::cause(detail);

        Err(FieldValidationError {
            causes: vec![FieldError {
                field,
                cause,
                code: Self::code(field, cause),
            }],
        })
    }
}
