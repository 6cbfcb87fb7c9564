//! Error types shared by every backend, the residency store and the gather
//! planner.

use crate::{storage::BackendId, tensor::DType};

/// Convenience result type used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// All failures that can surface from this crate.
///
/// Two kinds matter to a dispatcher: [`Error::Unimplemented`] is a capability
/// gap of the concrete backend (the caller may fall back to another backend),
/// while [`Error::Validation`] means the arguments themselves are unusable.
/// The remaining variants are raised by concrete backends while executing a
/// kernel.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backend does not provide this kernel.
    #[error(
        "'{kernel}' not yet implemented or not found in the registry. \
         Did you forget to import the kernel?"
    )]
    Unimplemented { kernel: &'static str },

    /// A gather/scatter precondition failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No backend owns the requested handle.
    #[error("no backend owns the requested data (requested by `{backend}`)")]
    DataNotFound { backend: BackendId },

    /// The backend was disposed and can no longer serve requests.
    #[error("backend `{backend}` has been disposed")]
    Disposed { backend: BackendId },

    /// Two operands must have identical shapes.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Two operands must have identical element types.
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },

    /// A buffer does not hold the number of elements its shape requires.
    #[error(
        "element count mismatch: shape {shape:?} requires {expected} \
         elements, got {got}"
    )]
    ElementCountMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    /// The kernel exists but does not handle this element type.
    #[error("'{kernel}' does not support dtype {dtype}")]
    UnsupportedDType { kernel: &'static str, dtype: DType },

    /// A scalar argument cannot be represented in the requested dtype.
    #[error("value {value} cannot be represented as {dtype}")]
    UnrepresentableValue { value: f64, dtype: DType },

    /// An axis argument does not exist for a tensor of the given rank.
    #[error("axis {axis} is out of range for a tensor of rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },

    /// An index addresses data outside of the source buffer.
    #[error("index {index:?} is out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<i32>, shape: Vec<usize> },
}

impl Error {
    /// Creates the "not yet implemented" failure for the named kernel.
    #[inline]
    #[must_use]
    pub const fn unimplemented(kernel: &'static str) -> Self {
        Self::Unimplemented { kernel }
    }

    /// Returns the kernel name if this is a capability gap.
    #[inline]
    #[must_use]
    pub const fn unimplemented_kernel(&self) -> Option<&'static str> {
        match *self {
            Self::Unimplemented { kernel } => Some(kernel),
            _ => None,
        }
    }
}

/// Failed preconditions of
/// [`prepare_and_validate`](crate::gather_nd::prepare_and_validate).
///
/// Each variant identifies exactly one violated condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(
        "gatherND expects the input to be rank 1 or higher, but the rank \
         was {rank}"
    )]
    InputRankTooLow { rank: usize },

    #[error(
        "gatherND expects the indices to be rank 1 or higher, but the rank \
         was {rank}"
    )]
    IndicesRankTooLow { rank: usize },

    #[error(
        "gatherND expects the indices to be int32 type, but the dtype was \
         {dtype}"
    )]
    IndicesDType { dtype: DType },

    #[error(
        "index innermost dimension length must be <= tensor rank; saw: \
         {innermost} vs. {rank}"
    )]
    InnermostDimTooLarge { innermost: usize, rank: usize },

    #[error(
        "Requested more than 0 entries, but input is empty. Input shape: \
         {shape:?}"
    )]
    EmptyInput { shape: Vec<usize> },
}
