//! Error handling for mathplan
//!
//! Engine failures are recovered per segment by the renderer, so they only
//! surface to callers that invoke an engine directly. Contract, form and
//! credential errors are returned to the caller as-is.

use std::fmt;

use crate::lesson::ValidationReport;

/// Typesetting engine error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The formula could not be parsed
    Parse { message: String },
    /// The formula uses a command that the current trust level forbids
    Untrusted { command: String },
    /// The engine produced output that cannot be inserted into a document
    Output { message: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Parse { message } => write!(f, "Parse error: {}", message),
            EngineError::Untrusted { command } => {
                write!(f, "Command '{}' is not allowed at this trust level", command)
            }
            EngineError::Output { message } => write!(f, "Rejected engine output: {}", message),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    pub fn parse(message: impl Into<String>) -> Self {
        EngineError::Parse {
            message: message.into(),
        }
    }

    pub fn untrusted(command: impl Into<String>) -> Self {
        EngineError::Untrusted {
            command: command.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        EngineError::Output {
            message: message.into(),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error raised while reading a generated lesson plan
#[derive(Debug, Clone)]
pub enum ContractError {
    /// The provider text is not JSON of the expected shape
    Json {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    /// The JSON has the right shape but breaks content rules
    Invalid(ValidationReport),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::Json {
                message,
                line,
                column,
            } => {
                if let (Some(l), Some(c)) = (line, column) {
                    write!(f, "Malformed lesson plan at line {}, column {}: {}", l, c, message)
                } else {
                    write!(f, "Malformed lesson plan: {}", message)
                }
            }
            ContractError::Invalid(report) => {
                write!(f, "Lesson plan failed validation with {} error(s)", report.error_count())?;
                if let Some(first) = report.errors().next() {
                    write!(f, "; first: {}", first)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ContractError {}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        let (line, column) = if err.line() > 0 {
            (Some(err.line()), Some(err.column()))
        } else {
            (None, None)
        };
        ContractError::Json {
            message: err.to_string(),
            line,
            column,
        }
    }
}

impl ContractError {
    pub fn json(message: impl Into<String>) -> Self {
        ContractError::Json {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// The validation report, if the failure came from validation.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ContractError::Invalid(report) => Some(report),
            ContractError::Json { .. } => None,
        }
    }
}

/// Form input error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required field is empty
    Missing { field: &'static str },
    /// A numeric field is outside its allowed range
    OutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing { field } => write!(f, "Missing required field '{}'", field),
            FormError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "Field '{}' must be between {} and {}, got {}",
                field, min, max, value
            ),
        }
    }
}

impl std::error::Error for FormError {}

/// Credential lookup error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No key is configured
    Absent,
    /// A key is configured but unusable
    Invalid { reason: String },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Absent => write!(f, "No API key is configured"),
            CredentialError::Invalid { reason } => write!(f, "Invalid API key: {}", reason),
        }
    }
}

impl std::error::Error for CredentialError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::parse("unexpected `}`");
        assert!(err.to_string().contains("Parse error"));
        assert!(err.to_string().contains("unexpected"));

        let err = EngineError::untrusted("\\href");
        assert!(err.to_string().contains("\\href"));
    }

    #[test]
    fn test_contract_error_from_json() {
        let err = serde_json::from_str::<serde_json::Value>("{ \"a\": ").unwrap_err();
        let msg = ContractError::from(err).to_string();
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::OutOfRange {
            field: "khoi_lop",
            value: 5,
            min: 6,
            max: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("khoi_lop"));
        assert!(msg.contains("between 6 and 9"));
    }

    #[test]
    fn test_credential_error_display() {
        assert_eq!(CredentialError::Absent.to_string(), "No API key is configured");
    }
}
