//! Sequential row-by-row import reconciliation.
//!
//! Rows are processed strictly in input order, one at a time, and the
//! lookup overlays in the [`ReconciliationContext`] are updated immediately
//! after each successful creation. That ordering is what lets a row
//! reference a sire or dam defined earlier in the same spreadsheet, so the
//! loop must never be parallelized or reordered.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::context::ReconciliationContext;
use super::store::BirdStore;
use super::types::{AutoCreated, BirdStatus, ImportResult, ImportRow, NewBird, Sex};
use crate::errors::ImportError;

/// Run one import batch against the caller's records.
///
/// Every row is attempted independently: a failed row is recorded in the
/// report and processing continues, so one bad line never blocks the rest
/// of the file. There is no rollback; birds created before a later row
/// fails stay created.
pub async fn reconcile_and_import(
    rows: &[ImportRow],
    ctx: &mut ReconciliationContext,
    store: &dyn BirdStore,
) -> ImportResult {
    info!("Importing {} rows", rows.len());

    let mut result = ImportResult::default();
    for row in rows {
        let outcome = import_row(row, ctx, store, &mut result.auto_created).await;
        match outcome {
            Ok(bird_id) => {
                debug!("Row {} created bird {}", row.row_number, bird_id);
                result.record_success();
            }
            Err(err) => {
                warn!("Row {} failed: {}", row.row_number, err);
                result.record_failure(row.row_number, &err);
            }
        }
    }

    info!(
        "Import finished: {} succeeded, {} failed",
        result.success, result.failed
    );
    result
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

async fn import_row(
    row: &ImportRow,
    ctx: &mut ReconciliationContext,
    store: &dyn BirdStore,
    auto_created: &mut AutoCreated,
) -> Result<i64, ImportError> {
    let sex =
        Sex::parse(&row.sex).ok_or_else(|| ImportError::InvalidSex(row.sex.trim().to_string()))?;

    let hatch_date = NaiveDate::parse_from_str(row.hatch_date.trim(), "%Y-%m-%d")
        .map_err(|_| ImportError::InvalidHatchDate(row.hatch_date.trim().to_string()))?;

    // Unrecognized statuses silently become ACTIVE; failing the row over a
    // non-critical field would reject otherwise-good data.
    let status = BirdStatus::parse(&row.status).unwrap_or_else(|| {
        if !row.status.trim().is_empty() {
            debug!(
                "Row {}: unrecognized status '{}', defaulting to ACTIVE",
                row.row_number,
                row.status.trim()
            );
        }
        BirdStatus::Active
    });

    // Coops are never auto-created here, unlike breeds below.
    let coop_id = match non_empty(&row.coop_name) {
        Some(name) => Some(
            ctx.coop_id(name)
                .ok_or_else(|| ImportError::CoopNotFound(name.to_string()))?,
        ),
        None => None,
    };

    let sire_id = match non_empty(&row.sire_name) {
        Some(reference) => Some(
            ctx.parent_id(reference)
                .ok_or_else(|| ImportError::SireNotFound(reference.to_string()))?,
        ),
        None => None,
    };

    let dam_id = match non_empty(&row.dam_name) {
        Some(reference) => Some(
            ctx.parent_id(reference)
                .ok_or_else(|| ImportError::DamNotFound(reference.to_string()))?,
        ),
        None => None,
    };

    let breed_id = match non_empty(&row.breed_name) {
        Some(name) => match ctx.breed_id(name) {
            Some(id) => Some(id),
            None => {
                let id = store.create_breed(name, row.breed_code.as_deref()).await?;
                ctx.insert_breed(name, id);
                auto_created.breeds.push(name.to_string());
                debug!("Row {}: auto-created breed '{}'", row.row_number, name);
                Some(id)
            }
        },
        None => None,
    };

    let bird = NewBird {
        name: non_empty(&row.name).map(str::to_string),
        sex,
        hatch_date,
        status,
        coop_id,
        sire_id,
        dam_id,
        breed_id,
        color: non_empty(&row.color).map(str::to_string),
        notes: row.notes.clone(),
    };

    let bird_id = store.create_bird(bird).await?;

    if let Some(band) = non_empty(&row.band_number) {
        store.create_band_identifier(bird_id, band).await?;
        ctx.insert_band(band, bird_id);
    }

    // Overlay update must land before the next row starts so in-batch
    // forward references resolve.
    if let Some(name) = non_empty(&row.name) {
        ctx.insert_bird_name(name, bird_id);
    }

    Ok(bird_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::memory::MemoryStore;

    fn row(row_number: usize) -> ImportRow {
        ImportRow {
            row_number,
            sex: "MALE".to_string(),
            hatch_date: "2024-03-01".to_string(),
            ..ImportRow::default()
        }
    }

    fn named_row(row_number: usize, name: &str) -> ImportRow {
        ImportRow {
            name: Some(name.to_string()),
            ..row(row_number)
        }
    }

    #[tokio::test]
    async fn bad_row_does_not_block_the_batch() {
        let rows = vec![
            named_row(1, "One"),
            ImportRow {
                sex: "XX".to_string(),
                ..named_row(2, "Two")
            },
            named_row(3, "Three"),
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert!(result.errors[0].error.contains("Invalid sex"));

        let names: Vec<_> = store
            .birds()
            .iter()
            .map(|b| b.bird.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["One", "Three"]);
    }

    #[tokio::test]
    async fn counters_always_cover_every_row() {
        let rows = vec![
            row(1),
            ImportRow {
                hatch_date: "not-a-date".to_string(),
                ..row(2)
            },
            ImportRow {
                sex: String::new(),
                ..row(3)
            },
            row(4),
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;

        assert_eq!(result.success + result.failed, rows.len());
        assert_eq!(result.errors.len(), result.failed);
    }

    #[tokio::test]
    async fn later_row_resolves_bird_created_earlier_in_batch() {
        let rows = vec![
            named_row(1, "Dad"),
            ImportRow {
                sire_name: Some("dad".to_string()),
                ..named_row(2, "Junior")
            },
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert!(result.is_fully_successful(), "{:?}", result.errors);

        let birds = store.birds();
        let dad_id = birds[0].id;
        assert_eq!(birds[1].bird.sire_id, Some(dad_id));
    }

    #[tokio::test]
    async fn forward_reference_works_through_band_identifiers() {
        let rows = vec![
            ImportRow {
                band_number: Some("B-001".to_string()),
                ..row(1)
            },
            ImportRow {
                dam_name: Some("b-001".to_string()),
                sex: "FEMALE".to_string(),
                ..row(2)
            },
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert!(result.is_fully_successful(), "{:?}", result.errors);

        let birds = store.birds();
        assert_eq!(birds[1].bird.dam_id, Some(birds[0].id));
        assert_eq!(store.bands(), vec![(birds[0].id, "B-001".to_string())]);
    }

    #[tokio::test]
    async fn missing_coop_fails_the_row_and_creates_nothing() {
        let rows = vec![ImportRow {
            coop_name: Some("Nonexistent Coop".to_string()),
            ..row(1)
        }];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;

        assert_eq!(result.failed, 1);
        assert!(result.errors[0].error.contains("Nonexistent Coop"));
        assert!(store.birds().is_empty());
        assert!(result.auto_created.coops.is_empty());
    }

    #[tokio::test]
    async fn known_coop_resolves_case_insensitively() {
        let rows = vec![ImportRow {
            coop_name: Some("BROOD PEN A".to_string()),
            ..row(1)
        }];
        let mut ctx = ReconciliationContext::new();
        ctx.insert_coop("Brood Pen A", 42);
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert!(result.is_fully_successful());
        assert_eq!(store.birds()[0].bird.coop_id, Some(42));
    }

    #[tokio::test]
    async fn unknown_sire_fails_the_row() {
        let rows = vec![ImportRow {
            sire_name: Some("Ghost".to_string()),
            ..row(1)
        }];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].error.contains("Sire not found: 'Ghost'"));
    }

    #[tokio::test]
    async fn unrecognized_status_defaults_to_active() {
        let rows = vec![ImportRow {
            status: "SOLDD".to_string(),
            ..row(1)
        }];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert!(result.is_fully_successful());
        assert_eq!(store.birds()[0].bird.status, BirdStatus::Active);
    }

    #[tokio::test]
    async fn breed_auto_creates_once_and_is_reused() {
        let rows = vec![
            ImportRow {
                breed_name: Some("Kelso".to_string()),
                breed_code: Some("KEL".to_string()),
                ..row(1)
            },
            ImportRow {
                breed_name: Some("kelso".to_string()),
                ..row(2)
            },
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert!(result.is_fully_successful());
        assert_eq!(result.auto_created.breeds, vec!["Kelso"]);
        assert_eq!(store.breeds().len(), 1);

        let birds = store.birds();
        assert_eq!(birds[0].bird.breed_id, birds[1].bird.breed_id);
    }

    #[tokio::test]
    async fn store_failure_is_captured_and_batch_continues() {
        let rows = vec![named_row(1, "Cursed"), named_row(2, "Fine")];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::failing_on_bird("Cursed");

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;

        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].error.contains("simulated store failure"));
        assert_eq!(store.birds()[0].bird.name.as_deref(), Some("Fine"));
    }

    #[tokio::test]
    async fn failed_row_is_not_resolvable_later() {
        let rows = vec![
            ImportRow {
                sex: "XX".to_string(),
                ..named_row(1, "Dad")
            },
            ImportRow {
                sire_name: Some("Dad".to_string()),
                ..named_row(2, "Junior")
            },
        ];
        let mut ctx = ReconciliationContext::new();
        let store = MemoryStore::new();

        let result = reconcile_and_import(&rows, &mut ctx, &store).await;
        assert_eq!(result.failed, 2);
        assert!(result.errors[1].error.contains("Sire not found"));
    }
}
