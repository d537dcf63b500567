use crate::column::Int64Column;
use crate::core::error::{Error, Result};
use crate::frame::core::DataFrame;

const BASE_NAME: &str = "__row_index";

/// Temporary row-position column used to restore row order
///
/// The name is chosen to be absent from every frame it will touch, and the
/// column is attached and dropped within a single operation.
#[derive(Debug, Clone)]
pub struct RowIndex {
    name: String,
}

impl RowIndex {
    /// Pick a column name that none of `frames` uses
    pub fn unused_in(frames: &[&DataFrame]) -> Self {
        let taken = |name: &str| frames.iter().any(|f| f.contains_column(name));
        let mut name = BASE_NAME.to_string();
        let mut suffix = 0usize;
        while taken(&name) {
            suffix += 1;
            name = format!("{}_{}", BASE_NAME, suffix);
        }
        Self { name }
    }

    /// Column name of the index
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prepend positions `0..n`
    pub fn attach(&self, df: &DataFrame) -> Result<DataFrame> {
        df.with_row_index(&self.name)
    }

    /// Append explicit original positions, one per row
    pub fn attach_positions(&self, df: &DataFrame, positions: &[usize]) -> Result<DataFrame> {
        if positions.len() != df.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: df.row_count(),
                found: positions.len(),
            });
        }
        let mut out = df.clone();
        out.add_column(
            self.name.clone(),
            Int64Column::new(positions.iter().map(|&p| p as i64).collect()),
        )?;
        Ok(out)
    }

    /// Sort by the index and drop it
    pub fn restore_order(&self, df: &DataFrame) -> Result<DataFrame> {
        df.sort_by(&self.name, true)?.drop_columns(&[&self.name], true)
    }

    /// Drop the index without reordering
    pub fn detach(&self, df: &DataFrame) -> Result<DataFrame> {
        df.drop_columns(&[&self.name], true)
    }
}
