//! # The tensor module
//!
//! This module provides the descriptors a dispatcher hands to a backend: the
//! element type of a tensor, its shape, the handle of its data and the flat
//! host buffers used to move values in and out of a backend.

use core::fmt;

use crate::storage::DataId;

/// Tolerance used for numeric comparisons on 32-bit float backends.
pub const EPSILON_FLOAT32: f32 = 1e-7;

/// Tolerance used for numeric comparisons on 16-bit float backends.
pub const EPSILON_FLOAT16: f32 = 1e-4;

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float32,
    Int32,
    Bool,
    /// Pairs of 32-bit floats, stored interleaved as `[re, im, re, im, ..]`.
    Complex64,
}

impl DType {
    /// Size of one element in bytes.
    #[inline]
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
            Self::Bool => 1,
            Self::Complex64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Float32 => "float32",
            Self::Int32 => "int32",
            Self::Bool => "bool",
            Self::Complex64 => "complex64",
        };
        f.write_str(name)
    }
}

/// Highest float precision a backend computes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPrecision {
    Half,
    Single,
}

impl FloatPrecision {
    /// Width of the float type in bits (16 or 32).
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Half => 16,
            Self::Single => 32,
        }
    }

    /// Numeric tolerance matching this precision.
    #[inline]
    #[must_use]
    pub const fn epsilon(self) -> f32 {
        match self {
            Self::Half => EPSILON_FLOAT16,
            Self::Single => EPSILON_FLOAT32,
        }
    }
}

/// A flat, row-major host buffer of tensor values.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValues {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    Bool(Vec<bool>),
    /// Interleaved real and imaginary parts.
    Complex64(Vec<f32>),
}

impl DataValues {
    /// The element type held by this buffer.
    #[inline]
    #[must_use]
    pub const fn dtype(&self) -> DType {
        match *self {
            Self::Float32(_) => DType::Float32,
            Self::Int32(_) => DType::Int32,
            Self::Bool(_) => DType::Bool,
            Self::Complex64(_) => DType::Complex64,
        }
    }

    /// Number of logical elements (a complex pair counts once).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match *self {
            Self::Float32(ref values) => values.len(),
            Self::Int32(ref values) => values.len(),
            Self::Bool(ref values) => values.len(),
            Self::Complex64(ref values) => values.len() / 2,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes the buffer occupies.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().size_in_bytes()
    }
}

impl From<Vec<f32>> for DataValues {
    #[inline]
    fn from(value: Vec<f32>) -> Self {
        Self::Float32(value)
    }
}

impl From<Vec<i32>> for DataValues {
    #[inline]
    fn from(value: Vec<i32>) -> Self {
        Self::Int32(value)
    }
}

impl From<Vec<bool>> for DataValues {
    #[inline]
    fn from(value: Vec<bool>) -> Self {
        Self::Bool(value)
    }
}

/// Shape and element type of a tensor, without any data attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorDescriptor {
    shape: Vec<usize>,
    dtype: DType,
}

impl TensorDescriptor {
    #[inline]
    #[must_use]
    pub const fn new(shape: Vec<usize>, dtype: DType) -> Self {
        Self { shape, dtype }
    }

    #[inline]
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    #[must_use]
    pub const fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of dimensions.
    #[inline]
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements. A scalar (rank 0) holds one element.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

/// A tensor as seen by a backend: the handle of its data plus its
/// descriptor.
///
/// Cloning a `TensorInfo` clones the handle, which keeps the data reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorInfo {
    data_id: DataId,
    descriptor: TensorDescriptor,
}

impl TensorInfo {
    #[inline]
    #[must_use]
    pub const fn new(data_id: DataId, shape: Vec<usize>, dtype: DType) -> Self {
        Self {
            data_id,
            descriptor: TensorDescriptor::new(shape, dtype),
        }
    }

    #[inline]
    #[must_use]
    pub const fn data_id(&self) -> &DataId {
        &self.data_id
    }

    #[inline]
    #[must_use]
    pub const fn descriptor(&self) -> &TensorDescriptor {
        &self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.descriptor.shape()
    }

    #[inline]
    #[must_use]
    pub const fn dtype(&self) -> DType {
        self.descriptor.dtype()
    }

    #[inline]
    #[must_use]
    pub fn rank(&self) -> usize {
        self.descriptor.rank()
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.descriptor.size()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        storage::DataId,
        tensor::{DType, DataValues, FloatPrecision, TensorDescriptor, TensorInfo},
    };

    #[test]
    fn descriptor_size_is_product_of_shape() {
        let descriptor = TensorDescriptor::new(vec![2, 3, 4], DType::Float32);

        assert_eq!(descriptor.rank(), 3);
        assert_eq!(descriptor.size(), 24);
    }

    #[test]
    fn scalar_descriptor_has_one_element() {
        let descriptor = TensorDescriptor::new(vec![], DType::Int32);

        assert_eq!(descriptor.rank(), 0);
        assert_eq!(descriptor.size(), 1);
    }

    #[test]
    fn descriptor_with_zero_dim_is_empty() {
        let descriptor = TensorDescriptor::new(vec![3, 0], DType::Float32);

        assert_eq!(descriptor.size(), 0);
    }

    #[test]
    fn complex_values_count_pairs() {
        let values = DataValues::Complex64(vec![1.0, 0.0, 2.0, -1.0]);

        assert_eq!(values.len(), 2);
        assert_eq!(values.byte_len(), 16);
        assert_eq!(values.dtype(), DType::Complex64);
    }

    #[test]
    fn values_convert_from_vectors() {
        assert_eq!(DataValues::from(vec![1_i32, 2]).dtype(), DType::Int32);
        assert_eq!(DataValues::from(vec![true]).dtype(), DType::Bool);
        assert_eq!(DataValues::from(vec![0.5_f32]).byte_len(), 4);
    }

    #[test]
    fn precision_maps_to_bits_and_epsilon() {
        assert_eq!(FloatPrecision::Half.bits(), 16);
        assert_eq!(FloatPrecision::Single.bits(), 32);
        assert!(FloatPrecision::Half.epsilon() > FloatPrecision::Single.epsilon());
    }

    #[test]
    fn tensor_info_exposes_descriptor() {
        let id = DataId::new();
        let info = TensorInfo::new(id.clone(), vec![2, 2], DType::Bool);

        assert_eq!(info.data_id(), &id);
        assert_eq!(info.descriptor().shape(), &[2, 2]);
        assert_eq!(info.size(), 4);
    }

    #[test]
    fn dtype_display_matches_wire_names() {
        assert_eq!(DType::Float32.to_string(), "float32");
        assert_eq!(DType::Complex64.to_string(), "complex64");
    }
}
