//! The fit/transform contract shared by every pipeline step

use crate::core::error::Result;
use crate::frame::Frame;
use crate::ml::scope::DiagnosticScope;

/// A pipeline step: optional fitted state plus a frame-to-frame transformation
///
/// Re-running `fit` replaces all previously fitted state. The diagnostic scope
/// is assigned from outside (usually by a pipeline) before `fit`/`transform`
/// are called; it only controls side-channel artifacts, never output values.
pub trait Transformer: Send {
    /// Step name, used for diagnostic scope names and error messages
    fn name(&self) -> &str;

    /// Learn fitted parameters from `x` and optional target `y`
    ///
    /// Stateless steps keep the default no-op.
    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        let _ = (x, y);
        Ok(())
    }

    /// Apply the fitted parameters to `x`
    ///
    /// Takes `&mut self` so composite steps can hand their current scope down
    /// to the steps they own.
    fn transform(&mut self, x: &Frame) -> Result<Frame>;

    /// `fit` followed by `transform` on the same rows
    ///
    /// Composite steps override this to avoid predicting on rows they were
    /// fitted on.
    fn fit_transform(&mut self, x: &Frame, y: Option<&Frame>) -> Result<Frame> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// Current diagnostic scope, if any
    fn scope(&self) -> Option<&DiagnosticScope>;

    /// Assign (or clear) the diagnostic scope
    fn set_scope(&mut self, scope: Option<DiagnosticScope>);
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        (**self).fit(x, y)
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        (**self).transform(x)
    }

    fn fit_transform(&mut self, x: &Frame, y: Option<&Frame>) -> Result<Frame> {
        (**self).fit_transform(x, y)
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        (**self).scope()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        (**self).set_scope(scope)
    }
}

/// Builds fresh, unfitted model instances
///
/// Ensembles hold a factory instead of a model so every fold fits its own
/// instance and no fitted state can be shared between folds.
pub trait ModelFactory: Send + Sync {
    fn build(&self) -> Box<dyn Transformer>;
}

impl<F, T> ModelFactory for F
where
    F: Fn() -> T + Send + Sync,
    T: Transformer + 'static,
{
    fn build(&self) -> Box<dyn Transformer> {
        Box::new(self())
    }
}
