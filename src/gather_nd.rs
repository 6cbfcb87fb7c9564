//! Shape and stride planning for gather-style indexed reads.
//!
//! A gather reads `num_updates` index tuples of length `slice_rank` from the
//! innermost dimension of the index tensor. Each tuple addresses one
//! contiguous block of `slice_size` elements in the row-major source buffer:
//!
//! ```text
//! offset = slice_size * sum(index[j] * strides[j] for j in 0..slice_rank)
//! ```
//!
//! The planner only computes these quantities; executing the gather is left
//! to the backend.

use crate::{
    error::ValidationError,
    tensor::{DType, TensorDescriptor},
};

/// Everything a gather or scatter kernel needs to walk its index tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GatherNdPlan {
    /// `indices.shape[..-1] ++ input.shape[slice_rank..]`.
    pub result_shape: Vec<usize>,
    /// Number of index tuples.
    pub num_updates: usize,
    /// Number of contiguous elements addressed by one index tuple.
    pub slice_size: usize,
    /// One multiplier per tuple component, in units of whole slices.
    pub strides: Vec<usize>,
}

impl GatherNdPlan {
    /// Length of one index tuple.
    #[inline]
    #[must_use]
    pub fn slice_rank(&self) -> usize {
        self.strides.len()
    }
}

/// Validates `input` and `indices` for a gather and plans the read.
///
/// # Errors
///
/// Returns the first violated precondition, checked in this order: input
/// rank below 1, indices rank below 1, indices not `int32`, innermost index
/// dimension longer than the input rank, and an empty input.
///
/// # Examples
///
/// ```
/// use tensor_backend::{
///     gather_nd::prepare_and_validate,
///     tensor::{DType, TensorDescriptor},
/// };
///
/// let input = TensorDescriptor::new(vec![2, 3], DType::Float32);
/// let indices = TensorDescriptor::new(vec![2, 1], DType::Int32);
///
/// let plan = prepare_and_validate(&input, &indices).unwrap();
///
/// assert_eq!(plan.result_shape, vec![2, 3]);
/// assert_eq!(plan.slice_size, 3);
/// assert_eq!(plan.strides, vec![1]);
/// ```
pub fn prepare_and_validate(
    input: &TensorDescriptor,
    indices: &TensorDescriptor,
) -> Result<GatherNdPlan, ValidationError> {
    let input_shape = input.shape();
    let indices_shape = indices.shape();

    if input.rank() < 1 {
        return Err(ValidationError::InputRankTooLow { rank: input.rank() });
    }
    let Some((&slice_rank, outer)) = indices_shape.split_last() else {
        return Err(ValidationError::IndicesRankTooLow {
            rank: indices.rank(),
        });
    };

    if indices.dtype() != DType::Int32 {
        return Err(ValidationError::IndicesDType {
            dtype: indices.dtype(),
        });
    }
    if slice_rank > input.rank() {
        return Err(ValidationError::InnermostDimTooLarge {
            innermost: slice_rank,
            rank: input.rank(),
        });
    }
    if input.size() == 0 {
        return Err(ValidationError::EmptyInput {
            shape: input_shape.to_vec(),
        });
    }

    let num_updates = outer.iter().product();
    let slice_size = input_shape[slice_rank..].iter().product();

    let mut result_shape = outer.to_vec();
    result_shape.extend_from_slice(&input_shape[slice_rank..]);

    // Every stride kept below covers the whole slice, so the division is
    // exact.
    let strides = row_major_strides(input_shape)
        .into_iter()
        .map(|stride| stride / slice_size)
        .chain(core::iter::once(1))
        .take(slice_rank)
        .collect();

    Ok(GatherNdPlan {
        result_shape,
        num_updates,
        slice_size,
        strides,
    })
}

/// Row-major strides without the trailing unit stride, so a shape of rank
/// `n` yields `n - 1` entries.
fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len().saturating_sub(1));
    let mut stride = 1;
    for &dim in shape.iter().skip(1).rev() {
        stride *= dim;
        strides.push(stride);
    }
    strides.reverse();

    strides
}
