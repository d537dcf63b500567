use std::sync::Arc;

use crate::column::common::{utils, ColumnTrait, ColumnType};
use crate::core::error::{Error, Result};

/// Structure representing a categorical (string) column
#[derive(Debug, Clone)]
pub struct StringColumn {
    pub(crate) data: Arc<[String]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl StringColumn {
    /// Create a new StringColumn
    pub fn new(data: Vec<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    /// Create a StringColumn with NULL values
    pub fn with_nulls(data: Vec<String>, nulls: Vec<bool>) -> Self {
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

    /// Create a StringColumn from optional values
    pub fn from_options(values: Vec<Option<String>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(Option::is_none).collect();
        let data: Vec<String> = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        Self::with_nulls(data, nulls)
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get a string by index
    pub fn get(&self, index: usize) -> Result<Option<&str>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if utils::is_null_at(self.null_mask.as_deref(), index) {
            return Ok(None);
        }

        Ok(Some(&self.data[index]))
    }

    /// All values with NULLs as `None`
    pub fn to_options(&self) -> Vec<Option<String>> {
        (0..self.data.len())
            .map(|i| {
                if utils::is_null_at(self.null_mask.as_deref(), i) {
                    None
                } else {
                    Some(self.data[i].clone())
                }
            })
            .collect()
    }
}

impl ColumnTrait for StringColumn {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::String
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn null_count(&self) -> usize {
        utils::count_nulls(self.null_mask.as_deref(), self.data.len())
    }
}
