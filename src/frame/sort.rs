use std::cmp::Ordering;

use crate::column::ValueKey;
use crate::core::error::Result;
use crate::frame::core::DataFrame;

impl DataFrame {
    /// Sort DataFrame by column
    ///
    /// The sort is stable: rows with equal keys keep their relative order.
    /// NULL values are placed at the end regardless of direction.
    ///
    /// # Arguments
    /// * `by` - Name of the column to sort by
    /// * `ascending` - Whether to sort in ascending order
    ///
    /// # Returns
    /// * `Result<Self>` - A new DataFrame that is sorted
    pub fn sort_by(&self, by: &str, ascending: bool) -> Result<Self> {
        let indices = self.sorted_indices(by, ascending)?;
        self.take_rows(&indices)
    }

    /// Row positions in sorted order, without materializing the result
    pub fn sorted_indices(&self, by: &str, ascending: bool) -> Result<Vec<usize>> {
        let column = self.column(by)?;

        let mut pairs: Vec<(usize, Option<ValueKey>)> = (0..self.row_count)
            .map(|idx| Ok((idx, column.key_at(idx)?)))
            .collect::<Result<_>>()?;

        pairs.sort_by(|a, b| match (&a.1, &b.1) {
            (None, None) => Ordering::Equal,
            (None, _) => Ordering::Greater,
            (_, None) => Ordering::Less,
            (Some(val_a), Some(val_b)) => {
                if ascending {
                    val_a.cmp(val_b)
                } else {
                    val_b.cmp(val_a)
                }
            }
        });

        Ok(pairs.into_iter().map(|(idx, _)| idx).collect())
    }
}
