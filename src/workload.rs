use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Open-case counts per officer, shared by every routing call.
///
/// Selection of the least loaded officer and the increment of its counter
/// happen under one lock acquisition, so concurrent assignments never read
/// the same minimum and under-count.
pub struct WorkloadStore {
    counts: Mutex<BTreeMap<String, u32>>,
}

/// Outcome of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub officer_id: String,
    pub previous_load: u32,
}

impl WorkloadStore {
    pub fn new(seed: BTreeMap<String, u32>) -> Self {
        Self {
            counts: Mutex::new(seed),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, u32>>> {
        self.counts
            .lock()
            .map_err(|_| anyhow!("workload table lock poisoned"))
    }

    /// Pick the least loaded officer accepted by `eligible` and charge one case
    /// to them. Ties go to the lexicographically smallest id. `None` when no
    /// officer is eligible, in which case nothing is modified.
    pub fn assign_least_loaded<F>(&self, eligible: F) -> Result<Option<Assignment>>
    where
        F: Fn(&str) -> bool,
    {
        let mut counts = self.lock()?;

        // BTreeMap iterates in id order and min_by_key keeps the first minimum
        let chosen = counts
            .iter()
            .filter(|(id, _)| eligible(id.as_str()))
            .min_by_key(|(_, load)| **load)
            .map(|(id, load)| (id.clone(), *load));

        let Some((officer_id, previous_load)) = chosen else {
            return Ok(None);
        };

        if let Some(load) = counts.get_mut(&officer_id) {
            *load = load.saturating_add(1);
        }

        Ok(Some(Assignment {
            officer_id,
            previous_load,
        }))
    }

    pub fn has_eligible<F>(&self, eligible: F) -> Result<bool>
    where
        F: Fn(&str) -> bool,
    {
        Ok(self.lock()?.keys().any(|id| eligible(id.as_str())))
    }

    pub fn load_of(&self, officer_id: &str) -> Result<Option<u32>> {
        Ok(self.lock()?.get(officer_id).copied())
    }

    pub fn snapshot(&self) -> Result<BTreeMap<String, u32>> {
        Ok(self.lock()?.clone())
    }

    pub fn total_load(&self) -> Result<u64> {
        Ok(self.lock()?.values().map(|v| *v as u64).sum())
    }
}
