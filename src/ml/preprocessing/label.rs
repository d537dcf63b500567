use std::collections::{HashMap, HashSet};

use super::ColumnSelector;
use crate::column::{Column, Int64Column, ValueKey};
use crate::core::error::{Error, Result};
use crate::frame::{DataFrame, Frame};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// How label codes are assigned to distinct values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelOrder {
    /// Codes follow the order values first appear in the fitting frame
    #[default]
    FirstSeen,
    /// Codes follow the sorted order of the distinct values
    Sorted,
}

/// Fitted value → code mapping for one column
#[derive(Debug, Clone)]
struct LabelMapping {
    column: String,
    codes: HashMap<ValueKey, i64>,
}

/// Encodes categorical values as dense `Int64` codes starting at 0
///
/// NULLs never receive a code. Values unseen during `fit` encode to NULL
/// instead of failing.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    columns: ColumnSelector,
    order: LabelOrder,
    mappings: Option<Vec<LabelMapping>>,
    scope: Option<DiagnosticScope>,
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelEncoder {
    /// Create a new LabelEncoder over all categorical columns
    pub fn new() -> Self {
        LabelEncoder {
            columns: ColumnSelector::Categorical,
            order: LabelOrder::FirstSeen,
            mappings: None,
            scope: None,
        }
    }

    /// Specify columns to encode
    pub fn with_columns(mut self, columns: impl Into<ColumnSelector>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn with_order(mut self, order: LabelOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of distinct codes learned for `column`
    pub fn n_classes(&self, column: &str) -> Option<usize> {
        self.mappings
            .as_ref()?
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.codes.len())
    }

    fn build_mapping(&self, column: &str, values: &Column) -> Result<LabelMapping> {
        let mut distinct: Vec<ValueKey> = Vec::new();
        let mut seen: HashSet<ValueKey> = HashSet::new();
        for i in 0..values.len() {
            if let Some(key) = values.key_at(i)? {
                if seen.insert(key.clone()) {
                    distinct.push(key);
                }
            }
        }

        if self.order == LabelOrder::Sorted {
            distinct.sort();
        }

        Ok(LabelMapping {
            column: column.to_string(),
            codes: distinct
                .into_iter()
                .enumerate()
                .map(|(code, key)| (key, code as i64))
                .collect(),
        })
    }
}

fn encode(df: DataFrame, mappings: &[LabelMapping]) -> Result<DataFrame> {
    let mut out = df;
    for mapping in mappings {
        let column = out.column(&mapping.column)?;
        let codes: Vec<Option<i64>> = (0..column.len())
            .map(|i| {
                Ok(column
                    .key_at(i)?
                    .and_then(|key| mapping.codes.get(&key).copied()))
            })
            .collect::<Result<_>>()?;
        out.with_column(mapping.column.clone(), Int64Column::from_options(codes))?;
    }
    Ok(out)
}

impl Transformer for LabelEncoder {
    fn name(&self) -> &str {
        "LabelEncoder"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        self.mappings = None;

        let mut mappings = Vec::new();
        for column in self.columns.resolve(df)? {
            let mapping = self.build_mapping(&column, df.column(&column)?)?;
            tracing::debug!(column = %column, classes = mapping.codes.len(), "label encoder fitted");
            mappings.push(mapping);
        }

        self.mappings = Some(mappings);
        Ok(())
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let mappings = self
            .mappings
            .clone()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        x.map_frame(self.name(), move |df| encode(df, &mappings))
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        self.scope.as_ref()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        self.scope = scope;
    }
}
