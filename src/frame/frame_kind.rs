use crate::core::error::{Error, Result};
use crate::frame::core::DataFrame;
use crate::frame::lazy::LazyFrame;

/// A frame handed between pipeline steps: materialized or deferred
#[derive(Debug, Clone)]
pub enum Frame {
    Eager(DataFrame),
    Lazy(LazyFrame),
}

impl Frame {
    /// Whether the frame is a deferred computation plan
    pub fn is_lazy(&self) -> bool {
        matches!(self, Frame::Lazy(_))
    }

    /// Borrow the materialized frame, if any
    pub fn as_eager(&self) -> Option<&DataFrame> {
        match self {
            Frame::Eager(df) => Some(df),
            Frame::Lazy(_) => None,
        }
    }

    /// Borrow the materialized frame or fail with `LazyEvaluationUnsupported`
    pub fn require_eager(&self, step: &str, operation: &str) -> Result<&DataFrame> {
        match self {
            Frame::Eager(df) => Ok(df),
            Frame::Lazy(_) => {
                tracing::warn!(step, operation, "lazy frame rejected");
                Err(Error::lazy(step, operation))
            }
        }
    }

    /// Materialize the frame, running the plan of a lazy frame
    pub fn collect(&self) -> Result<DataFrame> {
        match self {
            Frame::Eager(df) => Ok(df.clone()),
            Frame::Lazy(lazy) => lazy.collect(),
        }
    }

    /// Convert into a deferred frame
    pub fn lazy(self) -> LazyFrame {
        match self {
            Frame::Eager(df) => LazyFrame::new(df),
            Frame::Lazy(lazy) => lazy,
        }
    }

    /// Apply `f` now on an eager frame, or queue it on a lazy one
    ///
    /// The representation of the input is preserved.
    pub fn map_frame<F>(&self, name: &str, f: F) -> Result<Frame>
    where
        F: Fn(DataFrame) -> Result<DataFrame> + Send + Sync + 'static,
    {
        match self {
            Frame::Eager(df) => Ok(Frame::Eager(f(df.clone())?)),
            Frame::Lazy(lazy) => Ok(Frame::Lazy(lazy.clone().apply(name, f))),
        }
    }
}

impl From<DataFrame> for Frame {
    fn from(df: DataFrame) -> Self {
        Frame::Eager(df)
    }
}

impl From<LazyFrame> for Frame {
    fn from(lazy: LazyFrame) -> Self {
        Frame::Lazy(lazy)
    }
}
