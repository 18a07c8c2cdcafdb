//! Weighted skill allocation for a job draft.
//!
//! Every required skill carries an integer percentage. New entries are only
//! accepted while they fit in the remaining budget; edits to an existing weight
//! are applied as-is and the exact total is enforced later, when the draft
//! leaves the skills stage (see `skills::draft`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Budget every job's skill weights must add up to.
pub const TOTAL_WEIGHT: u32 = 100;

/// One required skill and its share of the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillWeight {
    #[serde(rename = "skill")]
    pub label: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("Skill name cannot be empty.")]
    EmptyLabel,

    #[error("Total weight exceeds 100%. Requested {requested}%, remaining {remaining}%.")]
    AllocationExceeded { requested: u32, remaining: i64 },

    #[error("Weight must be between 1 and 100, got {0}.")]
    InvalidWeight(u32),

    #[error("No skill at position {index} (have {len}).")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Sum of all weights.
pub fn total(entries: &[SkillWeight]) -> u32 {
    entries.iter().map(|e| e.weight).sum()
}

/// Budget left for new entries. Negative only if `set_weight` pushed the total past 100.
pub fn remaining(entries: &[SkillWeight]) -> i64 {
    i64::from(TOTAL_WEIGHT) - i64::from(total(entries))
}

pub fn can_add(entries: &[SkillWeight], weight: u32) -> bool {
    i64::from(weight) <= remaining(entries)
}

/// The ordered skill list of one job draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillAllocation {
    entries: Vec<SkillWeight>,
}

impl SkillAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps skills loaded from a stored job. No budget check.
    pub fn from_entries(entries: Vec<SkillWeight>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SkillWeight] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SkillWeight> {
        self.entries
    }

    pub fn total(&self) -> u32 {
        total(&self.entries)
    }

    pub fn remaining(&self) -> i64 {
        remaining(&self.entries)
    }

    pub fn can_add(&self, weight: u32) -> bool {
        can_add(&self.entries, weight)
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == TOTAL_WEIGHT
    }

    /// Appends a skill if it fits in the remaining budget. Never rebalances.
    pub fn add(&mut self, label: &str, weight: u32) -> Result<(), AllocationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AllocationError::EmptyLabel);
        }
        if !self.can_add(weight) {
            return Err(AllocationError::AllocationExceeded {
                requested: weight,
                remaining: self.remaining(),
            });
        }
        if weight == 0 {
            return Err(AllocationError::InvalidWeight(weight));
        }

        self.entries.push(SkillWeight {
            label: label.to_string(),
            weight,
        });
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<SkillWeight, AllocationError> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Overwrites one weight. The budget is not re-checked; the total is only
    /// gated when the draft is saved.
    pub fn set_weight(&mut self, index: usize, weight: u32) -> Result<(), AllocationError> {
        self.check_index(index)?;
        if !(1..=TOTAL_WEIGHT).contains(&weight) {
            return Err(AllocationError::InvalidWeight(weight));
        }
        self.entries[index].weight = weight;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), AllocationError> {
        if index >= self.entries.len() {
            return Err(AllocationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}
