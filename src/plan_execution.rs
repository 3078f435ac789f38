//! Plan-driven dry runs of import spreadsheets.

use std::path::Path;

use anyhow::Result;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::common;
use crate::data_loader;
use crate::import::{reconcile_and_import, ImportResult, MemoryStore, ReconciliationContext};
use crate::plan::Plan;

/// Outcome of one spreadsheet from the plan.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReport {
    pub filename: String,
    pub result: ImportResult,
}

fn load_file(file_path: &str) -> Result<(Vec<String>, Vec<StringRecord>)> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    let (separator, records) = match extension {
        "csv" => (b',', data_loader::load_csv(file_path)?),
        "tsv" => (b'\t', data_loader::load_tsv(file_path)?),
        _ => {
            error!("Error: unsupported extension {}", extension);
            anyhow::bail!("Unsupported extension");
        }
    };

    let headers = data_loader::get_headers_from_file(file_path, separator)?;
    Ok((headers, records))
}

/// Seed a context from the plan's `known` records.
///
/// Dry runs only need references to resolve, not real database ids, so
/// known records get negative placeholder ids that can never collide with
/// ids assigned by the store.
fn seed_context(plan: &Plan) -> ReconciliationContext {
    let mut ctx = ReconciliationContext::new();
    for (i, coop) in plan.known.coops.iter().enumerate() {
        ctx.insert_coop(coop, -(i as i64 + 1));
    }
    for (i, bird) in plan.known.birds.iter().enumerate() {
        let id = -1000 - i as i64;
        if let Some(name) = &bird.name {
            ctx.insert_bird_name(name, id);
        }
        if let Some(band) = &bird.band {
            ctx.insert_band(band, id);
        }
    }
    for (i, breed) in plan.known.breeds.iter().enumerate() {
        ctx.insert_breed(breed, -2000 - i as i64);
    }
    ctx
}

/// Run every profile in the plan against an in-memory store and report the
/// outcome per file. Profiles share one context, so birds from an earlier
/// file resolve as parents in a later one.
pub async fn execute_plan(plan_path: &str) -> Result<Vec<ProfileReport>> {
    info!("Executing import plan");

    let plan_file_path = Path::new(plan_path);
    let path_content = std::fs::read_to_string(plan_file_path)?;
    let plan: Plan = serde_yaml::from_str(&path_content)?;

    debug!("Executing plan: {:?}", plan);

    let mut ctx = seed_context(&plan);
    let store = MemoryStore::new();
    let mut reports = Vec::new();

    for profile in &plan.import.profiles {
        let import_file_path = plan_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&profile.filename);
        info!("Checking file: {}", import_file_path.display());

        let import_file = import_file_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Non-UTF8 path: {}", import_file_path.display()))?;

        let (headers, records) = load_file(import_file)?;
        data_loader::verify_bird_headers(&headers)?;

        let column_profile = data_loader::create_bird_column_profile(&headers);
        debug!("{}", column_profile);

        if let Some(band_column) = column_profile.band_column {
            data_loader::verify_band_column(&records, band_column)?;
        }

        let rows = data_loader::rows_from_records(&records, &column_profile);
        if rows.is_empty() {
            anyhow::bail!("No data rows in {}", profile.filename);
        }

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        reports.push(ProfileReport {
            filename: profile.filename.clone(),
            result,
        });
    }

    if let Some(report_path) = &plan.report {
        let report_file = plan_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(report_path);
        let json = serde_json::to_string_pretty(&reports)?;
        common::write_string_to_file(
            report_file
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Non-UTF8 path: {}", report_file.display()))?,
            &json,
        )?;
        info!("Wrote report to {}", report_file.display());
    }

    Ok(reports)
}
