// ⚖️ Comparison Set - bounded selection for side-by-side comparison
//
// Holds vehicle ids (not vehicles) in insertion order. The catalog stays
// the owner of the records; lookups go through it.

use serde::Serialize;

use crate::catalog::{Catalog, Vehicle, VehicleId};

/// Most vehicles that can be compared at once
pub const MAX_COMPARED: usize = 3;

// ============================================================================
// SIGNALS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonAction {
    Added,
    Removed,
}

/// A successful toggle: which vehicle moved and in which direction.
/// Callers format announcements from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonChange<'a> {
    pub vehicle: &'a Vehicle,
    pub action: ComparisonAction,
}

/// Rejected transitions. The set is never mutated when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("comparison is limited to {limit} vehicles")]
    CapacityExceeded { limit: usize },

    #[error("vehicle {0} is not in the catalog")]
    NotFound(VehicleId),
}

// ============================================================================
// COMPARISON SET
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSet {
    ids: Vec<VehicleId>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vehicle.
    ///
    /// Returns `Ok(true)` when appended and `Ok(false)` when it was already
    /// present (even if the set is full).
    pub fn add(&mut self, catalog: &Catalog, id: VehicleId) -> Result<bool, ComparisonError> {
        if !catalog.contains(id) {
            return Err(ComparisonError::NotFound(id));
        }
        if self.contains(id) {
            return Ok(false);
        }
        if self.is_full() {
            return Err(ComparisonError::CapacityExceeded {
                limit: MAX_COMPARED,
            });
        }

        self.ids.push(id);
        Ok(true)
    }

    /// Remove if present, otherwise try to add
    pub fn toggle<'a>(
        &mut self,
        catalog: &'a Catalog,
        id: VehicleId,
    ) -> Result<ComparisonChange<'a>, ComparisonError> {
        let vehicle = catalog.find(id).ok_or(ComparisonError::NotFound(id))?;

        let action = if self.remove(id) {
            ComparisonAction::Removed
        } else {
            self.add(catalog, id)?;
            ComparisonAction::Added
        };

        Ok(ComparisonChange { vehicle, action })
    }

    /// Returns whether anything was removed
    pub fn remove(&mut self, id: VehicleId) -> bool {
        match self.ids.iter().position(|&existing| existing == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empty the set, returning how many vehicles were dropped
    pub fn clear(&mut self) -> usize {
        let removed = self.ids.len();
        self.ids.clear();
        removed
    }

    pub fn ids(&self) -> &[VehicleId] {
        &self.ids
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_COMPARED
    }

    /// Compared vehicles in insertion order
    pub fn vehicles<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Vehicle> {
        self.ids.iter().filter_map(|&id| catalog.find(id)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
