//! Column-store DataFrame with eager and lazy representations

pub mod column_ops;
pub mod convert;
pub mod core;
pub mod frame_kind;
pub mod group;
pub mod lazy;
pub mod row_index;
pub mod row_ops;
pub mod sort;

pub use self::core::DataFrame;
pub use frame_kind::Frame;
pub use group::{AggregateOp, GroupBy};
pub use lazy::{LazyFrame, Operation};
pub use row_index::RowIndex;
