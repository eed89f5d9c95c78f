//! Error types for mechanics operations
//!
//! Every fallible operation in the crate returns [`Result<T>`]. The variants
//! separate failures the caller can reasonably retry (a singular Euler-Lagrange
//! system, usually fixed with a smaller time step or different coordinates)
//! from wiring bugs (dimension mismatches, missing surface overrides).
//!
//! # Call-context chain
//!
//! Instead of a process-wide exception stack, errors carry their own context:
//!
//! ```rust
//! use lagrange_rs::error::{MechanicsError, Result, ResultExt};
//!
//! fn inner() -> Result<()> {
//!     Err(MechanicsError::dimension_mismatch("compute_kinetic_matrix", 2, 3))
//! }
//!
//! let err = inner().context("Lagrangian::kinetic_energy").unwrap_err();
//! assert!(err.is_dimension_mismatch());
//! assert_eq!(err.contexts(), vec!["Lagrangian::kinetic_energy"]);
//! ```

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, MechanicsError>;

/// Errors raised by the dynamics engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MechanicsError {
    /// Vector or matrix sizes disagree with the dof / element count.
    #[error("dimension mismatch in {operation}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Operation that detected the mismatch.
        operation: String,
        /// Expected size.
        expected: usize,
        /// Size actually received.
        actual: usize,
    },

    /// The Euler-Lagrange system A·q̈ = rhs has no usable pivot.
    #[error("singular Euler-Lagrange system: pivot {pivot} is {value:e}")]
    SingularSystem {
        /// Elimination column at which the pivot vanished.
        pivot: usize,
        /// Offending pivot (or determinant) value.
        value: f64,
    },

    /// A polymorphic surface was asked for something it does not provide.
    #[error("{operation} is not implemented by surface '{surface}'")]
    NotImplemented {
        /// Requested operation.
        operation: String,
        /// Name of the surface.
        surface: String,
    },

    /// Internal inconsistency between collaborators.
    #[error("logic error: {reason}")]
    Logic {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Invalid parameters or configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// `NaN` or `Inf` detected in the integrated state.
    #[error("integration diverged at step {step}: {reason}")]
    Diverged {
        /// Step index at which divergence was detected.
        step: usize,
        /// Description of what went wrong.
        reason: String,
    },

    /// A generalized coordinate left its box bounds.
    #[error("coordinate {dof} = {value} outside bounds [{min}, {max}]")]
    OutOfBounds {
        /// Offending dof.
        dof: usize,
        /// Current value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Error annotated with the operation that propagated it.
    #[error("{context}: {source}")]
    Context {
        /// Calling operation.
        context: String,
        /// Underlying error.
        #[source]
        source: Box<MechanicsError>,
    },
}

impl MechanicsError {
    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(operation: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create a not-implemented error.
    #[must_use]
    pub fn not_implemented(operation: impl Into<String>, surface: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
            surface: surface.into(),
        }
    }

    /// Create a logic error.
    #[must_use]
    pub fn logic(reason: impl Into<String>) -> Self {
        Self::Logic {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Wrap this error with the name of the calling operation.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with every context layer stripped.
    #[must_use]
    pub fn root(&self) -> &MechanicsError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Context chain, outermost first.
    #[must_use]
    pub fn contexts(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Self::Context { context, source } = current {
            chain.push(context.as_str());
            current = source;
        }
        chain
    }

    /// Check if this is a singular-system failure (retryable).
    #[must_use]
    pub fn is_singular(&self) -> bool {
        matches!(self.root(), Self::SingularSystem { .. })
    }

    /// Check if this is a dimension mismatch.
    #[must_use]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self.root(), Self::DimensionMismatch { .. })
    }

    /// Check if this is a missing surface override.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self.root(), Self::NotImplemented { .. })
    }

    /// Check if the caller may retry (smaller step, other coordinates).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_singular()
    }
}

/// Attach call context to a [`Result`].
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `context`.
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

/// Fail with [`MechanicsError::DimensionMismatch`] unless `actual == expected`.
pub(crate) fn ensure_len(operation: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MechanicsError::dimension_mismatch(operation, expected, actual))
    }
}
