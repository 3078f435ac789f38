//! Row-level import errors.
//!
//! Every error a row can hit is reported to the caller the same way, as a
//! `{row, error}` entry in the import report. The kind classification below
//! exists for logging and tests; it is not part of the report shape.

use thiserror::Error;

/// Why a single spreadsheet row was rejected.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Sex column held something other than MALE/FEMALE/UNKNOWN
    #[error("Invalid sex '{0}': expected MALE, FEMALE or UNKNOWN")]
    InvalidSex(String),

    /// Hatch date column did not parse as a calendar date
    #[error("Invalid hatch date '{0}': expected YYYY-MM-DD")]
    InvalidHatchDate(String),

    /// Referenced coop does not exist; coops are never auto-created
    #[error("Coop not found: '{0}'")]
    CoopNotFound(String),

    /// Referenced sire matched neither a bird name nor a band identifier
    #[error("Sire not found: '{0}'")]
    SireNotFound(String),

    /// Referenced dam matched neither a bird name nor a band identifier
    #[error("Dam not found: '{0}'")]
    DamNotFound(String),

    /// The backing store refused the record; message captured verbatim
    #[error("{0}")]
    Persistence(String),
}

/// Coarse classification of row failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    Validation,
    Resolution,
    Persistence,
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::InvalidSex(_) | ImportError::InvalidHatchDate(_) => {
                ImportErrorKind::Validation
            }
            ImportError::CoopNotFound(_)
            | ImportError::SireNotFound(_)
            | ImportError::DamNotFound(_) => ImportErrorKind::Resolution,
            ImportError::Persistence(_) => ImportErrorKind::Persistence,
        }
    }

    /// Detected before any persistence call was attempted.
    pub fn is_pre_persistence(&self) -> bool {
        self.kind() != ImportErrorKind::Persistence
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        ImportError::Persistence(err.to_string())
    }
}
