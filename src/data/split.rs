//! Train / validation / test partitioning.
//!
//! Unstratified mode shuffles all row indices once and slices them by the
//! floored ratios. Stratified mode does the same per stratum (rows sharing
//! one textual value of the stratification column, missing values forming
//! their own stratum), concatenates the slices per target, and re-shuffles
//! each target so strata are not contiguous in the output.
//!
//! In both modes each subset gets the floor of its share, and the rows the
//! floors leave over go to the last subset with a non-zero ratio (test,
//! unless its ratio is zero). Every row lands in exactly one subset and a
//! zero ratio always yields an empty subset.
//!
//! Seeding: one `StdRng` seeded from `seed` drives the permutation(s) in
//! stratum order; each final re-shuffle uses a fresh `StdRng` seeded with the
//! same `seed`.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{CellValue, Table};

const RATIO_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("split ratios must be non-negative and sum to 1.0, got {train}/{validation}/{test}")]
    InvalidRatio {
        train: f64,
        validation: f64,
        test: f64,
    },
    #[error("unknown stratification column '{0}'")]
    UnknownColumn(String),
}

// ---------------------------------------------------------------------------
// SplitRatios
// ---------------------------------------------------------------------------

/// Fractions of each stratum assigned to train / validation / test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        SplitRatios {
            train: 0.6,
            validation: 0.2,
            test: 0.2,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, validation: f64, test: f64) -> Result<Self, SplitError> {
        let ratios = SplitRatios {
            train,
            validation,
            test,
        };
        ratios.validate()?;
        Ok(ratios)
    }

    /// Check non-negativity and that the fractions sum to 1.0 (within 1e-6).
    pub fn validate(&self) -> Result<(), SplitError> {
        let parts = [self.train, self.validation, self.test];
        let sum: f64 = parts.iter().sum();
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) || (sum - 1.0).abs() >= RATIO_TOLERANCE {
            return Err(SplitError::InvalidRatio {
                train: self.train,
                validation: self.validation,
                test: self.test,
            });
        }
        Ok(())
    }

    /// Row counts for a group of `n` rows: floored shares, with the slack
    /// added to the last subset whose ratio is non-zero.
    fn allocate(&self, n: usize) -> [usize; 3] {
        let ratios = [self.train, self.validation, self.test];
        let mut counts = [0usize; 3];
        let mut left = n;
        for (count, ratio) in counts.iter_mut().zip(ratios) {
            *count = ((ratio * n as f64).floor() as usize).min(left);
            left -= *count;
        }
        let last = ratios.iter().rposition(|r| *r > 0.0).unwrap_or(2);
        counts[last] += left;
        counts
    }
}

// ---------------------------------------------------------------------------
// Split results
// ---------------------------------------------------------------------------

/// Row indices (into the input table) of each subset, in output order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// Row counts of the three subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitSizes {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl SplitIndices {
    pub fn sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.len(),
            validation: self.validation.len(),
            test: self.test.len(),
        }
    }

    fn extend_from(&mut self, mut group: Vec<usize>, ratios: &SplitRatios) {
        let [n_train, n_val, _] = ratios.allocate(group.len());
        let test = group.split_off(n_train + n_val);
        let validation = group.split_off(n_train);
        self.train.extend(group);
        self.validation.extend(validation);
        self.test.extend(test);
    }
}

/// The three materialized subsets, each re-indexed from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train: Table,
    pub validation: Table,
    pub test: Table,
}

// ---------------------------------------------------------------------------
// Strata
// ---------------------------------------------------------------------------

/// Grouping key: textual value, with missing values sorting last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Stratum {
    Value(String),
    Missing,
}

impl From<&CellValue> for Stratum {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Missing => Stratum::Missing,
            other => Stratum::Value(other.to_string()),
        }
    }
}

fn group_rows(values: &[CellValue]) -> BTreeMap<Stratum, Vec<usize>> {
    let mut groups: BTreeMap<Stratum, Vec<usize>> = BTreeMap::new();
    for (i, cell) in values.iter().enumerate() {
        groups.entry(Stratum::from(cell)).or_default().push(i);
    }
    groups
}

fn reshuffle(indices: &mut [usize], seed: u64) {
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Compute the partition as row indices into `table`.
pub fn split_indices(
    table: &Table,
    stratify_column: Option<&str>,
    seed: u64,
    ratios: &SplitRatios,
) -> Result<SplitIndices, SplitError> {
    ratios.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = SplitIndices::default();

    let Some(name) = stratify_column else {
        let mut all: Vec<usize> = (0..table.n_rows()).collect();
        all.shuffle(&mut rng);
        out.extend_from(all, ratios);
        return Ok(out);
    };

    let column = table
        .column(name)
        .ok_or_else(|| SplitError::UnknownColumn(name.to_string()))?;

    let groups = group_rows(&column.values);
    log::debug!("stratifying on '{name}': {} strata", groups.len());
    for (_, mut members) in groups {
        members.shuffle(&mut rng);
        out.extend_from(members, ratios);
    }

    reshuffle(&mut out.train, seed);
    reshuffle(&mut out.validation, seed);
    reshuffle(&mut out.test, seed);
    Ok(out)
}

/// Partition `table` into train / validation / test tables.
pub fn split(
    table: &Table,
    stratify_column: Option<&str>,
    seed: u64,
    ratios: &SplitRatios,
) -> Result<Partition, SplitError> {
    let indices = split_indices(table, stratify_column, seed, ratios)?;
    let sizes = indices.sizes();
    log::info!(
        "split {} rows -> train {}, validation {}, test {}",
        table.n_rows(),
        sizes.train,
        sizes.validation,
        sizes.test
    );
    Ok(Partition {
        train: table.take(&indices.train),
        validation: table.take(&indices.validation),
        test: table.take(&indices.test),
    })
}
