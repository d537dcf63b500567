use std::sync::Arc;

use crate::column::common::{utils, ColumnTrait, ColumnType};
use crate::core::error::{Error, Result};

/// Structure representing a Float64 column
#[derive(Debug, Clone)]
pub struct Float64Column {
    pub(crate) data: Arc<[f64]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl Float64Column {
    /// Create a new Float64Column
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    /// Create a Float64Column with NULL values
    pub fn with_nulls(data: Vec<f64>, nulls: Vec<bool>) -> Self {
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

    /// Create a Float64Column from optional values, `None` becoming NULL
    pub fn from_options(values: Vec<Option<f64>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(Option::is_none).collect();
        let data: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Self::with_nulls(data, nulls)
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get data at the specified index
    pub fn get(&self, index: usize) -> Result<Option<f64>> {
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
    pub fn to_options(&self) -> Vec<Option<f64>> {
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

impl ColumnTrait for Float64Column {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Float64
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn null_count(&self) -> usize {
        utils::count_nulls(self.null_mask.as_deref(), self.data.len())
    }
}
