//! Data shapes flowing through the import pipeline.
//!
//! An [`ImportRow`] is one parsed spreadsheet line with its fields still in
//! raw string form; validation happens row by row inside the reconciler so
//! a bad value rejects that row without touching the rest of the batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ImportError;

/// Bird sex as accepted by the import template.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Case-insensitive parse of the template's MALE/FEMALE/UNKNOWN values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "MALE" => Some(Sex::Male),
            "FEMALE" => Some(Sex::Female),
            "UNKNOWN" => Some(Sex::Unknown),
            _ => None,
        }
    }
}

/// Lifecycle status of a bird record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BirdStatus {
    #[default]
    Active,
    Breeder,
    Sold,
    Deceased,
    Culled,
    Retired,
}

impl BirdStatus {
    /// Case-insensitive parse. Returns `None` for unrecognized input; the
    /// reconciler falls back to [`BirdStatus::Active`] rather than failing
    /// the row over a non-critical field.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(BirdStatus::Active),
            "BREEDER" => Some(BirdStatus::Breeder),
            "SOLD" => Some(BirdStatus::Sold),
            "DECEASED" => Some(BirdStatus::Deceased),
            "CULLED" => Some(BirdStatus::Culled),
            "RETIRED" => Some(BirdStatus::Retired),
            _ => None,
        }
    }
}

/// One prospective bird, parsed from one spreadsheet line.
///
/// Consumed exactly once by the reconciler and then discarded; only the
/// resulting bird record is persisted.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    /// 1-based spreadsheet line number, used in error reports.
    pub row_number: usize,
    pub name: Option<String>,
    pub sex: String,
    pub hatch_date: String,
    pub status: String,
    pub coop_name: Option<String>,
    pub sire_name: Option<String>,
    pub dam_name: Option<String>,
    pub band_number: Option<String>,
    pub breed_name: Option<String>,
    pub breed_code: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// A fully validated and resolved bird, ready for the store.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewBird {
    pub name: Option<String>,
    pub sex: Sex,
    pub hatch_date: NaiveDate,
    pub status: BirdStatus,
    pub coop_id: Option<i64>,
    pub sire_id: Option<i64>,
    pub dam_id: Option<i64>,
    pub breed_id: Option<i64>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// One rejected row in the import report.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Names of records the import created as a side effect of resolving
/// references. Only breeds auto-create in this path; the other lists are
/// kept so the report shape matches the product's import summary.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoCreated {
    pub coops: Vec<String>,
    pub breeds: Vec<String>,
    pub sires: Vec<String>,
    pub dams: Vec<String>,
}

/// Outcome of one import batch. Built incrementally, one row at a time;
/// `success + failed` always equals the number of rows submitted.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub auto_created: AutoCreated,
}

impl ImportResult {
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self, row: usize, error: &ImportError) {
        self.failed += 1;
        self.errors.push(RowError {
            row,
            error: error.to_string(),
        });
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }
}
