use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::column::{BooleanColumn, Float64Column, Int64Column, StringColumn};
use crate::core::error::{Error, Result};

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    String,
    Boolean,
}

impl ColumnType {
    /// Whether values of this type can be read as `f64`
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Boolean
        )
    }
}

/// Behaviour shared by every concrete column type
pub trait ColumnTrait: Debug + Send + Sync {
    /// Returns the length of the column
    fn len(&self) -> usize;

    /// Returns whether the column is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type of the column
    fn column_type(&self) -> ColumnType;

    /// Returns the name of the column
    fn name(&self) -> Option<&str>;

    /// Returns the number of NULL values
    fn null_count(&self) -> usize;
}

/// Enum representing a column
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    String(StringColumn),
    Boolean(BooleanColumn),
}

/// Hashable, ordered view of a single non-NULL cell
///
/// Floats hash and compare by their total order so they can key maps.
#[derive(Debug, Clone)]
pub enum ValueKey {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ValueKey {
    fn rank(&self) -> u8 {
        match self {
            ValueKey::Bool(_) => 0,
            ValueKey::Int(_) => 1,
            ValueKey::Float(_) => 2,
            ValueKey::Str(_) => 3,
        }
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ValueKey {}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ValueKey::Int(a), ValueKey::Int(b)) => a.cmp(b),
            (ValueKey::Float(a), ValueKey::Float(b)) => normalize(*a).total_cmp(&normalize(*b)),
            (ValueKey::Str(a), ValueKey::Str(b)) => a.cmp(b),
            (ValueKey::Bool(a), ValueKey::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            ValueKey::Int(v) => v.hash(state),
            ValueKey::Float(v) => normalize(*v).to_bits().hash(state),
            ValueKey::Str(v) => v.hash(state),
            ValueKey::Bool(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKey::Int(v) => write!(f, "{}", v),
            ValueKey::Float(v) => write!(f, "{}", normalize(*v)),
            ValueKey::Str(v) => f.write_str(v),
            ValueKey::Bool(v) => write!(f, "{}", v),
        }
    }
}

// -0.0 and 0.0 must land on the same key
fn normalize(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Utility functions for column operations
pub mod utils {
    use std::sync::Arc;

    /// Creates a bitmask from a vector of boolean values
    pub fn create_bitmask(nulls: &[bool]) -> Arc<[u8]> {
        let length = nulls.len();
        let bytes_needed = (length + 7) / 8;
        let mut data = vec![0u8; bytes_needed];

        for (i, &is_null) in nulls.iter().enumerate() {
            if is_null {
                let byte_idx = i / 8;
                let bit_idx = i % 8;
                data[byte_idx] |= 1 << bit_idx;
            }
        }

        data.into()
    }

    /// Converts a bitmask to a vector of boolean values
    pub fn bitmask_to_bools(mask: &[u8], len: usize) -> Vec<bool> {
        (0..len).map(|i| is_null_at(Some(mask), i)).collect()
    }

    /// Checks the NULL bit for a row; a missing mask means no NULLs
    pub fn is_null_at(mask: Option<&[u8]>, index: usize) -> bool {
        match mask {
            None => false,
            Some(mask) => {
                let byte_idx = index / 8;
                let bit_idx = index % 8;
                byte_idx < mask.len() && (mask[byte_idx] & (1 << bit_idx)) != 0
            }
        }
    }

    /// Counts the NULL bits among the first `len` rows
    pub fn count_nulls(mask: Option<&[u8]>, len: usize) -> usize {
        match mask {
            None => 0,
            Some(_) => (0..len).filter(|&i| is_null_at(mask, i)).count(),
        }
    }
}

// Column enum implementation
impl Column {
    /// Returns the length of the column
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(col) => col.len(),
            Column::Float64(col) => col.len(),
            Column::String(col) => col.len(),
            Column::Boolean(col) => col.len(),
        }
    }

    /// Returns whether the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type of the column
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
            Column::Boolean(_) => ColumnType::Boolean,
        }
    }

    /// Returns the name of the column
    pub fn name(&self) -> Option<&str> {
        match self {
            Column::Int64(col) => col.name.as_deref(),
            Column::Float64(col) => col.name.as_deref(),
            Column::String(col) => col.name.as_deref(),
            Column::Boolean(col) => col.name.as_deref(),
        }
    }

    /// Returns a copy of the column carrying a new name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut column = self.clone();
        match &mut column {
            Column::Int64(col) => col.set_name(name),
            Column::Float64(col) => col.set_name(name),
            Column::String(col) => col.set_name(name),
            Column::Boolean(col) => col.set_name(name),
        }
        column
    }

    /// Casts to Int64Column
    pub fn as_int64(&self) -> Option<&Int64Column> {
        match self {
            Column::Int64(col) => Some(col),
            _ => None,
        }
    }

    /// Casts to Float64Column
    pub fn as_float64(&self) -> Option<&Float64Column> {
        match self {
            Column::Float64(col) => Some(col),
            _ => None,
        }
    }

    /// Casts to StringColumn
    pub fn as_string(&self) -> Option<&StringColumn> {
        match self {
            Column::String(col) => Some(col),
            _ => None,
        }
    }

    /// Casts to BooleanColumn
    pub fn as_boolean(&self) -> Option<&BooleanColumn> {
        match self {
            Column::Boolean(col) => Some(col),
            _ => None,
        }
    }

    fn null_mask(&self) -> Option<&[u8]> {
        match self {
            Column::Int64(col) => col.null_mask.as_deref(),
            Column::Float64(col) => col.null_mask.as_deref(),
            Column::String(col) => col.null_mask.as_deref(),
            Column::Boolean(col) => col.null_mask.as_deref(),
        }
    }

    /// Whether the value at `index` is NULL
    pub fn is_null(&self, index: usize) -> bool {
        utils::is_null_at(self.null_mask(), index)
    }

    /// Per-row NULL flags
    pub fn null_flags(&self) -> Vec<bool> {
        (0..self.len()).map(|i| self.is_null(i)).collect()
    }

    /// Number of NULL values
    pub fn null_count(&self) -> usize {
        utils::count_nulls(self.null_mask(), self.len())
    }

    /// Hashable key for the value at `index`, `None` for NULL
    pub fn key_at(&self, index: usize) -> Result<Option<ValueKey>> {
        Ok(match self {
            Column::Int64(col) => col.get(index)?.map(ValueKey::Int),
            Column::Float64(col) => col.get(index)?.map(ValueKey::Float),
            Column::String(col) => col.get(index)?.map(|s| ValueKey::Str(s.to_string())),
            Column::Boolean(col) => col.get(index)?.map(ValueKey::Bool),
        })
    }

    /// Reads every value as `f64`; booleans become 0/1
    ///
    /// String columns cannot be read numerically.
    pub fn to_f64_options(&self) -> Result<Vec<Option<f64>>> {
        match self {
            Column::Float64(col) => Ok(col.to_options()),
            Column::Int64(col) => Ok(col
                .to_options()
                .into_iter()
                .map(|v| v.map(|x| x as f64))
                .collect()),
            Column::Boolean(col) => Ok(col
                .to_options()
                .into_iter()
                .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
                .collect()),
            Column::String(_) => Err(Error::ColumnTypeMismatch {
                name: self.name().unwrap_or_default().to_string(),
                expected: ColumnType::Float64,
                found: ColumnType::String,
            }),
        }
    }

    /// Gathers rows by position; positions may repeat
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let size = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= size) {
            return Err(Error::IndexOutOfBounds { index, size });
        }

        let column = match self {
            Column::Int64(col) => {
                let values = col.to_options();
                Column::Int64(Int64Column::from_options(
                    indices.iter().map(|&i| values[i]).collect(),
                ))
            }
            Column::Float64(col) => {
                let values = col.to_options();
                Column::Float64(Float64Column::from_options(
                    indices.iter().map(|&i| values[i]).collect(),
                ))
            }
            Column::String(col) => {
                let values = col.to_options();
                Column::String(StringColumn::from_options(
                    indices.iter().map(|&i| values[i].clone()).collect(),
                ))
            }
            Column::Boolean(col) => {
                let values = col.to_options();
                Column::Boolean(BooleanColumn::from_options(
                    indices.iter().map(|&i| values[i]).collect(),
                ))
            }
        };

        Ok(match self.name() {
            Some(name) => column.renamed(name),
            None => column,
        })
    }

    /// Concatenates columns of identical type end to end
    pub fn concat(columns: &[&Column]) -> Result<Self> {
        let first = columns
            .first()
            .ok_or_else(|| Error::InvalidInput("cannot concatenate zero columns".to_string()))?;
        let name = first.name().unwrap_or_default().to_string();
        let expected = first.column_type();
        for column in columns.iter().skip(1) {
            if column.column_type() != expected {
                return Err(Error::ColumnTypeMismatch {
                    name,
                    expected,
                    found: column.column_type(),
                });
            }
        }

        let column = match expected {
            ColumnType::Int64 => Column::Int64(Int64Column::from_options(
                columns
                    .iter()
                    .filter_map(|c| c.as_int64())
                    .flat_map(|c| c.to_options())
                    .collect(),
            )),
            ColumnType::Float64 => Column::Float64(Float64Column::from_options(
                columns
                    .iter()
                    .filter_map(|c| c.as_float64())
                    .flat_map(|c| c.to_options())
                    .collect(),
            )),
            ColumnType::String => Column::String(StringColumn::from_options(
                columns
                    .iter()
                    .filter_map(|c| c.as_string())
                    .flat_map(|c| c.to_options())
                    .collect(),
            )),
            ColumnType::Boolean => Column::Boolean(BooleanColumn::from_options(
                columns
                    .iter()
                    .filter_map(|c| c.as_boolean())
                    .flat_map(|c| c.to_options())
                    .collect(),
            )),
        };
        Ok(column.renamed(name))
    }

    /// Converts the column to another type, keeping NULLs
    ///
    /// Floats are rounded to the nearest integer when cast to `Int64`; strings
    /// must parse cleanly or the cast fails.
    pub fn cast(&self, target: ColumnType) -> Result<Self> {
        if self.column_type() == target {
            return Ok(self.clone());
        }
        let name = self.name().unwrap_or_default().to_string();

        let column = match target {
            ColumnType::Float64 => match self {
                Column::String(col) => Column::Float64(Float64Column::from_options(
                    col.to_options()
                        .into_iter()
                        .map(|v| v.map(|s| parse_value::<f64>(&name, &s)).transpose())
                        .collect::<Result<Vec<_>>>()?,
                )),
                _ => Column::Float64(Float64Column::from_options(self.to_f64_options()?)),
            },
            ColumnType::Int64 => match self {
                Column::String(col) => Column::Int64(Int64Column::from_options(
                    col.to_options()
                        .into_iter()
                        .map(|v| v.map(|s| parse_value::<i64>(&name, &s)).transpose())
                        .collect::<Result<Vec<_>>>()?,
                )),
                _ => Column::Int64(Int64Column::from_options(
                    self.to_f64_options()?
                        .into_iter()
                        .map(|v| {
                            v.map(|x| {
                                if x.is_finite() {
                                    Ok(x.round() as i64)
                                } else {
                                    Err(Error::InvalidValue(format!(
                                        "cannot cast {} in column {} to Int64",
                                        x, name
                                    )))
                                }
                            })
                            .transpose()
                        })
                        .collect::<Result<Vec<_>>>()?,
                )),
            },
            ColumnType::Boolean => match self {
                Column::String(col) => Column::Boolean(BooleanColumn::from_options(
                    col.to_options()
                        .into_iter()
                        .map(|v| v.map(|s| parse_value::<bool>(&name, &s)).transpose())
                        .collect::<Result<Vec<_>>>()?,
                )),
                _ => Column::Boolean(BooleanColumn::from_options(
                    self.to_f64_options()?
                        .into_iter()
                        .map(|v| v.map(|x| x != 0.0))
                        .collect(),
                )),
            },
            ColumnType::String => {
                let values: Vec<Option<String>> = match self {
                    Column::Int64(col) => col
                        .to_options()
                        .into_iter()
                        .map(|v| v.map(|x| x.to_string()))
                        .collect(),
                    Column::Float64(col) => col
                        .to_options()
                        .into_iter()
                        .map(|v| v.map(|x| x.to_string()))
                        .collect(),
                    Column::Boolean(col) => col
                        .to_options()
                        .into_iter()
                        .map(|v| v.map(|x| x.to_string()))
                        .collect(),
                    Column::String(col) => col.to_options(),
                };
                Column::String(StringColumn::from_options(values))
            }
        };

        Ok(column.renamed(name))
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        Error::InvalidValue(format!("cannot parse '{}' in column {}", raw, name))
    })
}

impl From<Int64Column> for Column {
    fn from(col: Int64Column) -> Self {
        Column::Int64(col)
    }
}

impl From<Float64Column> for Column {
    fn from(col: Float64Column) -> Self {
        Column::Float64(col)
    }
}

impl From<StringColumn> for Column {
    fn from(col: StringColumn) -> Self {
        Column::String(col)
    }
}

impl From<BooleanColumn> for Column {
    fn from(col: BooleanColumn) -> Self {
        Column::Boolean(col)
    }
}
