//! Teacher-entered form inputs.

use serde::{Deserialize, Serialize};

use crate::utils::error::FormError;

pub const MIN_GRADE: u8 = 6;
pub const MAX_GRADE: u8 = 9;
pub const MIN_SESSIONS: u8 = 1;
pub const MAX_SESSIONS: u8 = 10;

/// Topic, grade, session count and free-form notes.
///
/// Every field is optional on the wire; [`FormInputs::validate`] enforces
/// which ones a generation request needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInputs {
    #[serde(rename = "ten_bai_day", default)]
    pub topic: Option<String>,
    #[serde(rename = "khoi_lop", default)]
    pub grade: Option<u8>,
    #[serde(rename = "so_tiet", default)]
    pub sessions: Option<u8>,
    #[serde(rename = "ghi_chu", default)]
    pub notes: Option<String>,
}

impl Default for FormInputs {
    fn default() -> Self {
        Self {
            topic: Some(String::new()),
            grade: Some(8),
            sessions: Some(2),
            notes: Some(String::new()),
        }
    }
}

/// Inputs that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm<'a> {
    pub topic: &'a str,
    pub grade: u8,
    pub sessions: u8,
    /// `None` when the notes are absent or blank.
    pub notes: Option<&'a str>,
}

impl FormInputs {
    pub fn new(topic: impl Into<String>, grade: u8, sessions: u8) -> Self {
        Self {
            topic: Some(topic.into()),
            grade: Some(grade),
            sessions: Some(sessions),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check required fields and ranges.
    pub fn validate(&self) -> Result<ValidForm<'_>, FormError> {
        let topic = self
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(FormError::Missing {
                field: "ten_bai_day",
            })?;
        let grade = self.grade.ok_or(FormError::Missing { field: "khoi_lop" })?;
        check_range("khoi_lop", grade, MIN_GRADE, MAX_GRADE)?;
        let sessions = self.sessions.ok_or(FormError::Missing { field: "so_tiet" })?;
        check_range("so_tiet", sessions, MIN_SESSIONS, MAX_SESSIONS)?;

        Ok(ValidForm {
            topic,
            grade,
            sessions,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty()),
        })
    }
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), FormError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FormError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Competency tier for a grade: 1 for grades 6-7, 2 for grades 8-9.
pub fn competency_tier(grade: u8) -> u8 {
    if grade <= 7 {
        1
    } else {
        2
    }
}
