//! Debt report domain model
//!
//! - `DebtReportForm`: the raw, untrusted intake payload (every field optional)
//! - `DebtReport`: a validated report, immutable once built
//! - `NoticeResult`, `AudioArtifact`, `FollowUpOutcome`: follow-up workflow values

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(f) => f,
            ValidationError::InvalidField { field, .. } => field,
        }
    }
}

/// A validated salary debt report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtReport {
    pub employer_name: String,
    pub employee_name: String,
    pub employee_wallet: String,
    pub debt_amount: f64,
    pub due_date: NaiveDate,
}

impl DebtReport {
    pub fn new(
        employer_name: impl Into<String>,
        employee_name: impl Into<String>,
        employee_wallet: impl Into<String>,
        debt_amount: f64,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            employer_name: employer_name.into(),
            employee_name: employee_name.into(),
            employee_wallet: employee_wallet.into(),
            debt_amount,
            due_date,
        }
    }

    /// Due date rendered the way it was submitted (`YYYY-MM-DD`)
    pub fn due_date_str(&self) -> String {
        self.due_date.format(DUE_DATE_FORMAT).to_string()
    }
}

/// Raw intake payload. Fields are kept as JSON values so a wrong type is
/// reported against the field that carries it rather than failing the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtReportForm {
    #[serde(default)]
    pub employer_name: Option<Value>,
    #[serde(default)]
    pub employee_name: Option<Value>,
    #[serde(default)]
    pub employee_wallet: Option<Value>,
    #[serde(default)]
    pub debt_amount: Option<Value>,
    #[serde(default)]
    pub due_date: Option<Value>,
}

impl DebtReportForm {
    /// Check every required field and build a `DebtReport`.
    /// Fields are checked in declaration order; the first problem wins.
    pub fn validate(&self) -> Result<DebtReport, ValidationError> {
        let employer_name = required_text("employer_name", &self.employer_name)?;
        let employee_name = required_text("employee_name", &self.employee_name)?;
        let employee_wallet = required_text("employee_wallet", &self.employee_wallet)?;
        let debt_amount = required_amount("debt_amount", &self.debt_amount)?;
        let due_date = required_date("due_date", &self.due_date)?;

        Ok(DebtReport {
            employer_name,
            employee_name,
            employee_wallet,
            debt_amount,
            due_date,
        })
    }
}

fn present<'a>(field: &'static str, v: &'a Option<Value>) -> Result<&'a Value, ValidationError> {
    match v {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn required_text(field: &'static str, v: &Option<Value>) -> Result<String, ValidationError> {
    match present(field, v)? {
        Value::String(s) => Ok(s.trim().to_string()),
        other => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn required_amount(field: &'static str, v: &Option<Value>) -> Result<f64, ValidationError> {
    let amount = match present(field, v)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ValidationError::InvalidField {
        field,
        reason: "expected a number".to_string(),
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must be a positive amount".to_string(),
        });
    }
    Ok(amount)
}

fn required_date(field: &'static str, v: &Option<Value>) -> Result<NaiveDate, ValidationError> {
    let raw = required_text(field, v)?;
    NaiveDate::parse_from_str(&raw, DUE_DATE_FORMAT).map_err(|e| ValidationError::InvalidField {
        field,
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

/// Which provider produced a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeProvider {
    Primary,
    Fallback,
}

impl NoticeProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeProvider::Primary => "primary",
            NoticeProvider::Fallback => "fallback",
        }
    }
}

/// A composed debt notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeResult {
    pub text: String,
    pub provider: NoticeProvider,
}

/// Audio file written by the speech renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Result of one follow-up run. Reported to an `OutcomeSink`, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpOutcome {
    pub text_message: String,
    pub notice_provider: NoticeProvider,
    pub audio_filename: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}
