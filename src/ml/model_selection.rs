//! Cross-validation splitters and hold-out splitting
//!
//! A splitter maps row positions to folds. Every splitter here yields
//! validation partitions that are disjoint and together cover every row, and
//! each fold trains on exactly the complement of its validation rows.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::column::{Column, ValueKey};
use crate::core::error::{Error, Result};
use crate::frame::DataFrame;

/// Row positions of one cross-validation fold, both sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
}

impl Fold {
    /// Build a fold from its validation rows; training rows are the rest of `0..n`
    pub fn from_valid(mut valid: Vec<usize>, n: usize) -> Self {
        valid.sort_unstable();
        let mut in_valid = vec![false; n];
        for &i in &valid {
            in_valid[i] = true;
        }
        let train = (0..n).filter(|&i| !in_valid[i]).collect();
        Fold { train, valid }
    }
}

/// Produces train/validation partitions over the rows of `(x, y)`
pub trait CrossValidator: Send + Sync {
    /// Number of folds produced
    fn n_splits(&self) -> usize;

    /// Partition the rows; `groups` carries one label per row when grouping applies
    fn split(&self, x: &DataFrame, y: &DataFrame, groups: Option<&Column>) -> Result<Vec<Fold>>;
}

fn check_splits(name: &str, n_splits: usize, n_samples: usize) -> Result<()> {
    if n_splits < 2 {
        return Err(Error::InvalidConfig(format!(
            "{} needs at least 2 splits, got {}",
            name, n_splits
        )));
    }
    if n_splits > n_samples {
        return Err(Error::InvalidConfig(format!(
            "{} cannot make {} splits from {} rows",
            name, n_splits, n_samples
        )));
    }
    Ok(())
}

fn shuffled(n: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }
    indices
}

fn folds_from_assignment(assignment: &[usize], n_splits: usize) -> Vec<Fold> {
    let mut valid: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
    for (row, &fold) in assignment.iter().enumerate() {
        valid[fold].push(row);
    }
    valid
        .into_iter()
        .map(|rows| Fold::from_valid(rows, assignment.len()))
        .collect()
}

/// Plain k-fold over contiguous (optionally shuffled) blocks
///
/// The first `n % k` folds receive one extra row.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            shuffle: false,
            seed: 42,
        }
    }

    /// Shuffle rows with a seeded generator before cutting folds
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }
}

impl CrossValidator for KFold {
    fn n_splits(&self) -> usize {
        self.n_splits
    }

    fn split(&self, x: &DataFrame, _y: &DataFrame, _groups: Option<&Column>) -> Result<Vec<Fold>> {
        let n = x.row_count();
        check_splits("KFold", self.n_splits, n)?;

        let order = shuffled(n, self.shuffle.then_some(self.seed));
        let mut assignment = vec![0usize; n];
        let (base, extra) = (n / self.n_splits, n % self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            for &row in &order[start..start + size] {
                assignment[row] = fold;
            }
            start += size;
        }
        Ok(folds_from_assignment(&assignment, self.n_splits))
    }
}

/// K-fold preserving the class proportions of a single-column target
///
/// Rows of each class are dealt round-robin over the folds, continuing where
/// the previous class stopped so fold sizes differ by at most one.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        StratifiedKFold {
            n_splits,
            shuffle: false,
            seed: 42,
        }
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }
}

impl CrossValidator for StratifiedKFold {
    fn n_splits(&self) -> usize {
        self.n_splits
    }

    fn split(&self, x: &DataFrame, y: &DataFrame, _groups: Option<&Column>) -> Result<Vec<Fold>> {
        let n = x.row_count();
        check_splits("StratifiedKFold", self.n_splits, n)?;
        if y.column_count() != 1 || y.row_count() != n {
            return Err(Error::InvalidInput(format!(
                "StratifiedKFold needs a single target column with {} rows",
                n
            )));
        }
        let labels = y.column(&y.column_names()[0])?;

        let mut classes: Vec<Vec<usize>> = Vec::new();
        let mut class_of: HashMap<ValueKey, usize> = HashMap::new();
        for row in shuffled(n, self.shuffle.then_some(self.seed)) {
            let key = labels.key_at(row)?.ok_or_else(|| {
                Error::InvalidInput(format!("NULL class label at row {}", row))
            })?;
            let class = *class_of.entry(key).or_insert_with(|| {
                classes.push(Vec::new());
                classes.len() - 1
            });
            classes[class].push(row);
        }

        let mut assignment = vec![0usize; n];
        let mut next = 0usize;
        for rows in &classes {
            for &row in rows {
                assignment[row] = next % self.n_splits;
                next += 1;
            }
        }
        Ok(folds_from_assignment(&assignment, self.n_splits))
    }
}

/// K-fold that never splits a group across folds
///
/// Groups are placed largest first into the fold currently holding the
/// fewest rows.
#[derive(Debug, Clone)]
pub struct GroupKFold {
    n_splits: usize,
}

impl GroupKFold {
    pub fn new(n_splits: usize) -> Self {
        GroupKFold { n_splits }
    }
}

impl CrossValidator for GroupKFold {
    fn n_splits(&self) -> usize {
        self.n_splits
    }

    fn split(&self, x: &DataFrame, _y: &DataFrame, groups: Option<&Column>) -> Result<Vec<Fold>> {
        let n = x.row_count();
        let groups = groups.ok_or_else(|| {
            Error::InvalidConfig("GroupKFold needs group labels".to_string())
        })?;
        if groups.len() != n {
            return Err(Error::InconsistentRowCount {
                expected: n,
                found: groups.len(),
            });
        }

        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut group_of: HashMap<Option<ValueKey>, usize> = HashMap::new();
        for row in 0..n {
            let group = *group_of.entry(groups.key_at(row)?).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[group].push(row);
        }
        check_splits("GroupKFold", self.n_splits, members.len())?;

        // stable sort keeps first-seen order among equal sizes
        members.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut load = vec![0usize; self.n_splits];
        let mut assignment = vec![0usize; n];
        for rows in &members {
            let (lightest, _) = load
                .iter()
                .enumerate()
                .min_by_key(|(fold, size)| (**size, *fold))
                .ok_or_else(|| Error::Computation("no folds to assign".to_string()))?;
            load[lightest] += rows.len();
            for &row in rows {
                assignment[row] = lightest;
            }
        }
        Ok(folds_from_assignment(&assignment, self.n_splits))
    }
}

/// Randomly split rows into `(train, test)` frames
///
/// `test_size` is the fraction of rows held out, rounded up. Both parts keep
/// the original relative row order.
pub fn train_test_split(df: &DataFrame, test_size: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::InvalidConfig(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let n = df.row_count();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(Error::InvalidConfig(format!(
            "test_size {} leaves an empty partition of {} rows",
            test_size, n
        )));
    }

    let order = shuffled(n, Some(seed));
    let mut test: Vec<usize> = order[..n_test].to_vec();
    let mut train: Vec<usize> = order[n_test..].to_vec();
    test.sort_unstable();
    train.sort_unstable();

    Ok((df.take_rows(&train)?, df.take_rows(&test)?))
}
