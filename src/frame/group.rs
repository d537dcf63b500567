//! Grouped aggregation for DataFrame

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::column::{BooleanColumn, Column, ColumnType, Float64Column, Int64Column, ValueKey};
use crate::core::error::{Error, Result};
use crate::frame::core::DataFrame;

/// Order-independent reductions over the rows of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateOp {
    Mean,
    Sum,
    Min,
    Max,
    /// Logical AND over boolean columns
    All,
    /// Logical OR over boolean columns
    Any,
}

impl Default for AggregateOp {
    fn default() -> Self {
        AggregateOp::Mean
    }
}

/// Rows of a DataFrame grouped by the values of one key column
#[derive(Debug)]
pub struct GroupBy<'a> {
    df: &'a DataFrame,
    key: String,
    // Row positions per group, groups in first-seen order
    groups: Vec<Vec<usize>>,
}

impl DataFrame {
    /// Group rows by the values of `key`; NULL keys form their own group
    pub fn group_by(&self, key: &str) -> Result<GroupBy<'_>> {
        let column = self.column(key)?;

        let mut positions: HashMap<Option<ValueKey>, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for row in 0..self.row_count {
            let value = column.key_at(row)?;
            let group = *positions.entry(value).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(row);
        }

        Ok(GroupBy {
            df: self,
            key: key.to_string(),
            groups,
        })
    }
}

impl<'a> GroupBy<'a> {
    /// Number of distinct keys
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Apply `op` to every non-key column
    pub fn aggregate(&self, op: AggregateOp) -> Result<DataFrame> {
        self.aggregate_with(op, &HashMap::new())
    }

    /// Apply `default` to every non-key column, except those listed in `overrides`
    ///
    /// The output holds one row per group in first-seen order, the key column first.
    pub fn aggregate_with(
        &self,
        default: AggregateOp,
        overrides: &HashMap<String, AggregateOp>,
    ) -> Result<DataFrame> {
        let first_rows: Vec<usize> = self.groups.iter().map(|rows| rows[0]).collect();

        let mut result = DataFrame::new();
        result.add_column(self.key.clone(), self.df.column(&self.key)?.take(&first_rows)?)?;

        for (name, column) in self.df.iter_columns() {
            if name == self.key {
                continue;
            }
            let op = overrides.get(name).copied().unwrap_or(default);
            result.add_column(name, aggregate_column(name, column, &self.groups, op)?)?;
        }
        Ok(result)
    }
}

fn aggregate_column(
    name: &str,
    column: &Column,
    groups: &[Vec<usize>],
    op: AggregateOp,
) -> Result<Column> {
    match op {
        AggregateOp::Mean => {
            let values = column.to_f64_options()?;
            Ok(Column::Float64(Float64Column::from_options(
                groups
                    .iter()
                    .map(|rows| {
                        let valid: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
                        if valid.is_empty() {
                            None
                        } else {
                            Some(valid.iter().sum::<f64>() / valid.len() as f64)
                        }
                    })
                    .collect(),
            )))
        }
        AggregateOp::Sum => match column {
            Column::Float64(col) => {
                let values = col.to_options();
                Ok(Column::Float64(Float64Column::new(
                    groups
                        .iter()
                        .map(|rows| rows.iter().filter_map(|&r| values[r]).sum())
                        .collect(),
                )))
            }
            Column::Int64(col) => {
                let values = col.to_options();
                let sums = groups
                    .iter()
                    .map(|rows| {
                        rows.iter()
                            .filter_map(|&r| values[r])
                            .try_fold(0i64, |acc, v| acc.checked_add(v))
                            .ok_or_else(|| {
                                Error::Computation(format!("integer overflow summing '{}'", name))
                            })
                    })
                    .collect::<Result<Vec<i64>>>()?;
                Ok(Column::Int64(Int64Column::new(sums)))
            }
            Column::Boolean(col) => {
                let flags = col.to_options();
                Ok(Column::Int64(Int64Column::new(
                    groups
                        .iter()
                        .map(|rows| rows.iter().filter(|&&r| flags[r] == Some(true)).count() as i64)
                        .collect(),
                )))
            }
            Column::String(_) => Err(type_mismatch(name, ColumnType::Float64, column)),
        },
        AggregateOp::Min | AggregateOp::Max => {
            // Pick the extreme row of each group and gather it, so the type is kept
            let mut picks = Vec::with_capacity(groups.len());
            for rows in groups {
                let mut best: Option<(usize, ValueKey)> = None;
                for &row in rows {
                    if let Some(key) = column.key_at(row)? {
                        let better = match &best {
                            None => true,
                            Some((_, current)) if op == AggregateOp::Min => key < *current,
                            Some((_, current)) => key > *current,
                        };
                        if better {
                            best = Some((row, key));
                        }
                    }
                }
                picks.push(best.map(|(row, _)| row).unwrap_or(rows[0]));
            }
            column.take(&picks)
        }
        AggregateOp::All | AggregateOp::Any => {
            let flags = column
                .as_boolean()
                .ok_or_else(|| type_mismatch(name, ColumnType::Boolean, column))?
                .to_options();
            Ok(Column::Boolean(BooleanColumn::new(
                groups
                    .iter()
                    .map(|rows| {
                        let mut valid = rows.iter().filter_map(|&r| flags[r]);
                        if op == AggregateOp::All {
                            valid.all(|b| b)
                        } else {
                            valid.any(|b| b)
                        }
                    })
                    .collect(),
            )))
        }
    }
}

fn type_mismatch(name: &str, expected: ColumnType, column: &Column) -> Error {
    Error::ColumnTypeMismatch {
        name: name.to_string(),
        expected,
        found: column.column_type(),
    }
}
