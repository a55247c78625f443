//! Memoized regime comparison.
//!
//! Interactive callers recompute on every edit, usually with inputs they have
//! already seen. [`CachedComparator`] keys each result on the full input
//! triple; the rulebook is borrowed for the cache's lifetime so a cached
//! result can never outlive the rules that produced it.

use std::collections::HashMap;

use tracing::debug;

use crate::calculations::comparator::RegimeComparator;
use crate::models::{ComparisonResult, DeductionInputs, IncomeProfile, RegimeConfig};
use crate::rules::{ConfigurationGap, TaxRulebook};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ComparisonKey {
    income: IncomeProfile,
    deductions: DeductionInputs,
    config: RegimeConfig,
}

/// [`RegimeComparator`] with a bounded result cache.
///
/// When the cache reaches capacity it is cleared before the next insert.
#[derive(Debug)]
pub struct CachedComparator<'a> {
    comparator: RegimeComparator<'a>,
    results: HashMap<ComparisonKey, ComparisonResult>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<'a> CachedComparator<'a> {
    pub fn new(rulebook: &'a TaxRulebook) -> Self {
        Self::with_capacity(rulebook, DEFAULT_CAPACITY)
    }

    /// A zero `capacity` is treated as one.
    pub fn with_capacity(
        rulebook: &'a TaxRulebook,
        capacity: usize,
    ) -> Self {
        Self {
            comparator: RegimeComparator::new(rulebook),
            results: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Same contract as [`RegimeComparator::compare`]. Errors are not cached.
    pub fn compare(
        &mut self,
        income: &IncomeProfile,
        deductions: &DeductionInputs,
        config: &RegimeConfig,
    ) -> Result<ComparisonResult, ConfigurationGap> {
        let key = ComparisonKey {
            income: income.clone(),
            deductions: deductions.clone(),
            config: *config,
        };

        if let Some(result) = self.results.get(&key) {
            self.hits += 1;
            debug!(hits = self.hits, "comparison cache hit");
            return Ok(result.clone());
        }

        self.misses += 1;
        debug!(misses = self.misses, "comparison cache miss");

        let result = self.comparator.compare(income, deductions, config)?;
        if self.results.len() >= self.capacity {
            debug!(capacity = self.capacity, "comparison cache full, clearing");
            self.results.clear();
        }
        self.results.insert(key, result.clone());
        Ok(result)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
