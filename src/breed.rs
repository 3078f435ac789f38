//! Breed composition calculations for birds and their offspring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One breed's share of a bird's ancestry, in whole percent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreedComponent {
    pub breed_id: String,
    pub percentage: u32,
}

impl BreedComponent {
    pub fn new(breed_id: impl Into<String>, percentage: u32) -> Self {
        Self {
            breed_id: breed_id.into(),
            percentage,
        }
    }
}

/// A bird's breed makeup. An empty composition means "unknown/unset".
///
/// After [`BreedComposition::normalize`] the percentages of a non-empty
/// composition sum to exactly 100 and no breed appears twice. The entry
/// order is significant: the rounding remainder always lands on the first
/// entry, so reordering the input changes the output.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct BreedComposition {
    components: Vec<BreedComponent>,
}

impl BreedComposition {
    pub fn new(components: Vec<BreedComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[BreedComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn contains(&self, breed_id: &str) -> bool {
        self.components.iter().any(|c| c.breed_id == breed_id)
    }

    /// Redistribute 100% evenly across the unique breeds in the list.
    ///
    /// Duplicate breed ids are merged down to their first occurrence. Each
    /// of the N remaining breeds gets `100 / N` (floored) and the remainder
    /// goes entirely to the first entry, so `[A, B, C]` becomes 34/33/33.
    /// An empty composition stays empty.
    pub fn normalize(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let mut seen = std::collections::HashSet::new();
        self.components.retain(|c| seen.insert(c.breed_id.clone()));

        let n = self.components.len() as u32;
        let share = 100 / n;
        let remainder = 100 - share * n;

        for component in &mut self.components {
            component.percentage = share;
        }
        self.components[0].percentage += remainder;
    }

    /// Add a breed at an even share. Adding a breed that is already present
    /// is a no-op.
    pub fn add_breed(&mut self, breed_id: &str) {
        if self.contains(breed_id) {
            return;
        }
        let percentage = if self.components.is_empty() { 100 } else { 0 };
        self.components.push(BreedComponent::new(breed_id, percentage));
        self.normalize();
    }

    /// Remove a breed and redistribute its share. Removing the last breed
    /// leaves an empty composition, which is never normalized.
    pub fn remove_breed(&mut self, breed_id: &str) {
        self.components.retain(|c| c.breed_id != breed_id);
        if !self.components.is_empty() {
            self.normalize();
        }
    }

    /// Set one breed's percentage directly, clamped to 0..=100.
    ///
    /// Manual-override mode: the other entries are left alone, so the total
    /// may no longer be 100 until the caller normalizes or saves. Unknown
    /// breed ids are ignored.
    pub fn set_percentage(&mut self, breed_id: &str, value: i64) {
        let clamped = value.clamp(0, 100) as u32;
        if let Some(component) = self.components.iter_mut().find(|c| c.breed_id == breed_id) {
            component.percentage = clamped;
        }
    }
}

/// Compute a child's breed composition from its parents.
///
/// Each parent contributes half of every component; breeds shared by both
/// parents accumulate, so two pure Kelso parents produce a 100% Kelso
/// child. Totals are rounded half-up and entries that round to zero are
/// dropped. The result is ordered by descending percentage, ties broken by
/// breed id, so repeated calls on the same parents are identical.
pub fn child_composition(
    sire: Option<&BreedComposition>,
    dam: Option<&BreedComposition>,
) -> BreedComposition {
    let mut totals: IndexMap<String, f64> = IndexMap::new();

    for parent in [sire, dam].into_iter().flatten() {
        for component in parent.components() {
            *totals.entry(component.breed_id.clone()).or_insert(0.0) +=
                component.percentage as f64 / 2.0;
        }
    }

    let mut components: Vec<BreedComponent> = totals
        .into_iter()
        .filter_map(|(breed_id, total)| {
            // Round half-up; totals are exact multiples of 0.5.
            let rounded = (total + 0.5).floor() as u32;
            (rounded > 0).then(|| BreedComponent::new(breed_id, rounded))
        })
        .collect();

    components.sort_by(|a, b| {
        b.percentage
            .cmp(&a.percentage)
            .then_with(|| a.breed_id.cmp(&b.breed_id))
    });

    BreedComposition::new(components)
}
