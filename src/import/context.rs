//! Per-batch lookup state for reference resolution.

use indexmap::IndexMap;

/// Lookup overlays for one `reconcile_and_import` call.
///
/// Seeded from the caller's existing records and then extended in place as
/// rows are created, so a bird defined early in the batch is resolvable as
/// a sire or dam by every later row. Owned by exactly one import run; the
/// engine never shares a context across batches.
///
/// All keys are matched case-insensitively (trimmed and lowercased on both
/// insert and lookup).
#[derive(Debug, Default)]
pub struct ReconciliationContext {
    coops: IndexMap<String, i64>,
    birds_by_name: IndexMap<String, i64>,
    birds_by_band: IndexMap<String, i64>,
    breeds: IndexMap<String, i64>,
}

fn key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl ReconciliationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_coop(&mut self, name: &str, id: i64) {
        self.coops.insert(key(name), id);
    }

    pub fn insert_bird_name(&mut self, name: &str, id: i64) {
        self.birds_by_name.insert(key(name), id);
    }

    pub fn insert_band(&mut self, band: &str, id: i64) {
        self.birds_by_band.insert(key(band), id);
    }

    pub fn insert_breed(&mut self, name: &str, id: i64) {
        self.breeds.insert(key(name), id);
    }

    pub fn coop_id(&self, name: &str) -> Option<i64> {
        self.coops.get(&key(name)).copied()
    }

    pub fn breed_id(&self, name: &str) -> Option<i64> {
        self.breeds.get(&key(name)).copied()
    }

    /// Resolve a sire/dam reference: bird names take precedence, band
    /// identifiers are the fallback.
    pub fn parent_id(&self, reference: &str) -> Option<i64> {
        let k = key(reference);
        self.birds_by_name
            .get(&k)
            .or_else(|| self.birds_by_band.get(&k))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_case_insensitive() {
        let mut ctx = ReconciliationContext::new();
        ctx.insert_coop("Brood Pen A", 7);
        assert_eq!(ctx.coop_id("brood pen a"), Some(7));
        assert_eq!(ctx.coop_id("  BROOD PEN A  "), Some(7));
        assert_eq!(ctx.coop_id("brood pen b"), None);
    }

    #[test]
    fn parent_prefers_name_over_band() {
        let mut ctx = ReconciliationContext::new();
        ctx.insert_band("ace", 1);
        ctx.insert_bird_name("Ace", 2);
        assert_eq!(ctx.parent_id("ACE"), Some(2));
    }

    #[test]
    fn parent_falls_back_to_band() {
        let mut ctx = ReconciliationContext::new();
        ctx.insert_band("B-0042", 9);
        assert_eq!(ctx.parent_id("b-0042"), Some(9));
        assert_eq!(ctx.parent_id("B-0043"), None);
    }

    #[test]
    fn later_inserts_override_earlier_ids() {
        let mut ctx = ReconciliationContext::new();
        ctx.insert_bird_name("Dad", 1);
        ctx.insert_bird_name("Dad", 5);
        assert_eq!(ctx.parent_id("dad"), Some(5));
    }
}
