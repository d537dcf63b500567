use std::sync::Arc;

use crate::column::common::{utils, ColumnTrait, ColumnType};
use crate::core::error::{Error, Result};

/// Structure representing an Int64 column
#[derive(Debug, Clone)]
pub struct Int64Column {
    pub(crate) data: Arc<[i64]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl Int64Column {
    /// Create a new Int64Column
    pub fn new(data: Vec<i64>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    /// Create an Int64Column with NULL values
    pub fn with_nulls(data: Vec<i64>, nulls: Vec<bool>) -> Self {
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

    /// Create an Int64Column from optional values
    pub fn from_options(values: Vec<Option<i64>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(Option::is_none).collect();
        let data: Vec<i64> = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        Self::with_nulls(data, nulls)
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get data at the specified index
    pub fn get(&self, index: usize) -> Result<Option<i64>> {
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
    pub fn to_options(&self) -> Vec<Option<i64>> {
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

impl ColumnTrait for Int64Column {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Int64
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn null_count(&self) -> usize {
        utils::count_nulls(self.null_mask.as_deref(), self.data.len())
    }
}
