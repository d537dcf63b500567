use std::sync::Arc;

use crate::column::common::{utils, ColumnTrait, ColumnType};
use crate::core::error::{Error, Result};

/// Structure representing a boolean column
#[derive(Debug, Clone)]
pub struct BooleanColumn {
    pub(crate) data: Arc<[bool]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl BooleanColumn {
    /// Create a new BooleanColumn from a vector of booleans
    pub fn new(data: Vec<bool>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    /// Create a BooleanColumn with NULL values
    pub fn with_nulls(data: Vec<bool>, nulls: Vec<bool>) -> Self {
        let null_mask = if nulls.iter().any(|&is_null| is_null) {
            Some(utils::create_bitmask(&nulls))
        } else {
            None
        };

        Self {
            data: data.into(),
            null_mask,
            name: None,
        }
    }

    /// Create a BooleanColumn from optional values
    pub fn from_options(values: Vec<Option<bool>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(Option::is_none).collect();
        let data: Vec<bool> = values.into_iter().map(|v| v.unwrap_or(false)).collect();
        Self::with_nulls(data, nulls)
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get a boolean value by index
    pub fn get(&self, index: usize) -> Result<Option<bool>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if utils::is_null_at(self.null_mask.as_deref(), index) {
            return Ok(None);
        }

        Ok(Some(self.data[index]))
    }

    /// All values with NULLs as `None`
    pub fn to_options(&self) -> Vec<Option<bool>> {
        (0..self.data.len())
            .map(|i| {
                if utils::is_null_at(self.null_mask.as_deref(), i) {
                    None
                } else {
                    Some(self.data[i])
                }
            })
            .collect()
    }
}

impl ColumnTrait for BooleanColumn {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Boolean
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn null_count(&self) -> usize {
        utils::count_nulls(self.null_mask.as_deref(), self.data.len())
    }
}
