//! The generic computational backend.
//!
//! This module provides the [`KernelBackend`] trait which defines the
//! complete contract between the op-dispatch layer and a compute backend:
//! buffer lifecycle, introspection and one method per kernel.
//!
//! The default backend is [`ndarray`] and can be swapped out using crate
//! feature flags.

pub mod ndarray;
pub mod ops;

use futures::future::{self, LocalBoxFuture};

use crate::{
    backend::ops::{
        Conv2dInfo, Conv3dInfo, DataFormat, FusedBatchMatMulConfig,
        FusedConv2dConfig, LrnParams, MemoryInfo, ResizeMethod, TimingInfo,
    },
    error::{Error, Result},
    storage::DataId,
    tensor::{DType, DataValues, FloatPrecision, TensorInfo},
};

/// A trait that defines the contract every compute backend must fulfill.
///
/// A backend owns the buffers of the tensors resident on it (usually through
/// a [`DataStore`](crate::storage::DataStore)) and executes kernels on them.
/// Kernels receive [`TensorInfo`] descriptors, resolve the handles to their
/// own buffers, and return descriptors of freshly written results.
///
/// Every method has a default body returning [`Error::Unimplemented`] with
/// the kernel's name, so a backend can be written incrementally and only
/// override what it supports. A dispatcher treats that error as a capability
/// gap and may retry the kernel on another backend.
///
/// A backend instance is driven by one logical owner at a time. Calls are
/// synchronous to the caller, except [`KernelBackend::read`] which suspends
/// until the device has finished pending work.
pub trait KernelBackend {
    /// Runs `f` against this backend and reports how long it took.
    fn time(
        &mut self,
        _f: &mut dyn FnMut(&mut dyn KernelBackend) -> Result<()>,
    ) -> Result<TimingInfo> {
        Err(Error::unimplemented("time"))
    }

    /// Reads the values behind `data_id` once the device has finished every
    /// pending write to it.
    ///
    /// The returned future yields to the executor instead of blocking the
    /// calling thread.
    fn read(
        &mut self,
        _data_id: &DataId,
    ) -> LocalBoxFuture<'_, Result<DataValues>> {
        Box::pin(future::ready(Err(Error::unimplemented("read"))))
    }

    /// Reads the values behind `data_id`, blocking the calling thread until
    /// the device has finished every pending write to it.
    fn read_sync(&mut self, _data_id: &DataId) -> Result<DataValues> {
        Err(Error::unimplemented("readSync"))
    }

    /// Number of handles resident on this backend.
    fn num_data_ids(&self) -> Result<usize> {
        Err(Error::unimplemented("numDataIds"))
    }

    /// Releases the buffer behind `data_id`. Returns whether it was
    /// resident.
    fn dispose_data(&mut self, _data_id: &DataId) -> Result<bool> {
        Err(Error::unimplemented("disposeData"))
    }

    /// Materializes `values` with the given shape and returns a fresh handle.
    fn write(
        &mut self,
        _values: DataValues,
        _shape: &[usize],
    ) -> Result<DataId> {
        Err(Error::unimplemented("write"))
    }

    /// Makes `values` resident under an existing handle, typically when the
    /// data migrates here from another backend.
    fn move_data(
        &mut self,
        _data_id: &DataId,
        _values: DataValues,
        _shape: &[usize],
    ) -> Result<()> {
        Err(Error::unimplemented("move"))
    }

    fn memory(&self) -> Result<MemoryInfo> {
        Err(Error::unimplemented("memory"))
    }

    /// Highest float precision this backend computes with.
    fn float_precision(&self) -> Result<FloatPrecision> {
        Err(Error::unimplemented("floatPrecision"))
    }

    /// Numeric tolerance matching [`KernelBackend::float_precision`].
    fn epsilon(&self) -> Result<f32> {
        Ok(self.float_precision()?.epsilon())
    }

    // Matrix products

    /// Batched matrix product of the two innermost dimensions.
    fn batch_mat_mul(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
        _transpose_a: bool,
        _transpose_b: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("batchMatMul"))
    }

    /// [`KernelBackend::batch_mat_mul`] followed by bias and activation.
    fn fused_batch_mat_mul(
        &mut self,
        _config: FusedBatchMatMulConfig<'_>,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("fusedBatchMatMul"))
    }

    // Slicing and joining

    fn slice(
        &mut self,
        _x: &TensorInfo,
        _begin: &[usize],
        _size: &[usize],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("slice"))
    }

    fn strided_slice(
        &mut self,
        _x: &TensorInfo,
        _begin: &[i64],
        _end: &[i64],
        _strides: &[i64],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("stridedSlice"))
    }

    fn unstack(
        &mut self,
        _x: &TensorInfo,
        _axis: usize,
    ) -> Result<Vec<TensorInfo>> {
        Err(Error::unimplemented("unstack"))
    }

    fn reverse(
        &mut self,
        _x: &TensorInfo,
        _axes: &[usize],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("reverse"))
    }

    fn concat(
        &mut self,
        _tensors: &[&TensorInfo],
        _axis: usize,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("concat"))
    }

    // Elementwise arithmetic

    fn neg(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("neg"))
    }

    fn add(&mut self, _a: &TensorInfo, _b: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("add"))
    }

    /// Sums any number of equally shaped tensors.
    fn add_n(&mut self, _tensors: &[&TensorInfo]) -> Result<TensorInfo> {
        Err(Error::unimplemented("addN"))
    }

    fn subtract(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("subtract"))
    }

    fn multiply(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("multiply"))
    }

    fn real_divide(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("realDivide"))
    }

    fn floor_div(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("floorDiv"))
    }

    // Reductions

    /// Sums over `axes`, removing them from the result shape.
    fn sum(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("sum"))
    }

    fn prod(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("prod"))
    }

    fn unsorted_segment_sum(
        &mut self,
        _x: &TensorInfo,
        _segment_ids: &TensorInfo,
        _num_segments: usize,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("unsortedSegmentSum"))
    }

    fn arg_min(&mut self, _x: &TensorInfo, _axis: usize) -> Result<TensorInfo> {
        Err(Error::unimplemented("argMin"))
    }

    fn arg_max(&mut self, _x: &TensorInfo, _axis: usize) -> Result<TensorInfo> {
        Err(Error::unimplemented("argMax"))
    }

    // Comparison and logic

    fn equal(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("equal"))
    }

    fn not_equal(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("notEqual"))
    }

    fn less(&mut self, _a: &TensorInfo, _b: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("less"))
    }

    fn less_equal(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("lessEqual"))
    }

    fn greater(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("greater"))
    }

    fn greater_equal(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("greaterEqual"))
    }

    fn logical_not(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("logicalNot"))
    }

    fn logical_and(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("logicalAnd"))
    }

    fn logical_or(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("logicalOr"))
    }

    /// Coordinates of the true elements of `condition`.
    fn where_(&mut self, _condition: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("where"))
    }

    fn select(
        &mut self,
        _condition: &TensorInfo,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("select"))
    }

    /// The `k` largest values along the innermost axis and their indices.
    fn topk(
        &mut self,
        _x: &TensorInfo,
        _k: usize,
        _sorted: bool,
    ) -> Result<(TensorInfo, TensorInfo)> {
        Err(Error::unimplemented("topk"))
    }

    fn min(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("min"))
    }

    fn minimum(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("minimum"))
    }

    fn mod_(&mut self, _a: &TensorInfo, _b: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("mod"))
    }

    fn max(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("max"))
    }

    fn maximum(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("maximum"))
    }

    fn all(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("all"))
    }

    fn any(&mut self, _x: &TensorInfo, _axes: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("any"))
    }

    fn squared_difference(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("squaredDifference"))
    }

    // Elementwise math

    fn ceil(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("ceil"))
    }

    fn floor(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("floor"))
    }

    fn round(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("round"))
    }

    fn sign(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("sign"))
    }

    fn is_nan(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("isNaN"))
    }

    fn is_inf(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("isInf"))
    }

    fn is_finite(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("isFinite"))
    }

    fn pow(&mut self, _a: &TensorInfo, _b: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("pow"))
    }

    fn exp(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("exp"))
    }

    fn expm1(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("expm1"))
    }

    fn softmax(&mut self, _x: &TensorInfo, _dim: usize) -> Result<TensorInfo> {
        Err(Error::unimplemented("softmax"))
    }

    fn log(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("log"))
    }

    fn log1p(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("log1p"))
    }

    fn sqrt(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("sqrt"))
    }

    fn rsqrt(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("rsqrt"))
    }

    fn square(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("square"))
    }

    fn reciprocal(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("reciprocal"))
    }

    fn relu(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("relu"))
    }

    fn relu6(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("relu6"))
    }

    fn prelu(
        &mut self,
        _x: &TensorInfo,
        _alpha: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("prelu"))
    }

    fn elu(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("elu"))
    }

    fn elu_der(
        &mut self,
        _dy: &TensorInfo,
        _y: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("eluDer"))
    }

    fn selu(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("selu"))
    }

    /// Truncates to `int32`.
    fn int(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("int"))
    }

    fn clip(
        &mut self,
        _x: &TensorInfo,
        _min: f32,
        _max: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("clip"))
    }

    fn abs(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("abs"))
    }

    fn complex_abs(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("complexAbs"))
    }

    fn sigmoid(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("sigmoid"))
    }

    fn softplus(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("softplus"))
    }

    fn sin(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("sin"))
    }

    fn cos(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("cos"))
    }

    fn tan(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("tan"))
    }

    fn asin(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("asin"))
    }

    fn acos(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("acos"))
    }

    fn atan(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("atan"))
    }

    fn atan2(
        &mut self,
        _a: &TensorInfo,
        _b: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("atan2"))
    }

    fn sinh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("sinh"))
    }

    fn cosh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("cosh"))
    }

    fn tanh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("tanh"))
    }

    fn asinh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("asinh"))
    }

    fn acosh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("acosh"))
    }

    fn atanh(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("atanh"))
    }

    fn erf(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("erf"))
    }

    fn step(&mut self, _x: &TensorInfo, _alpha: f32) -> Result<TensorInfo> {
        Err(Error::unimplemented("step"))
    }

    // Convolution

    fn fused_conv2d(
        &mut self,
        _config: FusedConv2dConfig<'_>,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("fusedConv2d"))
    }

    fn conv2d(
        &mut self,
        _x: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv2d"))
    }

    fn conv2d_der_input(
        &mut self,
        _dy: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv2dDerInput"))
    }

    fn conv2d_der_filter(
        &mut self,
        _x: &TensorInfo,
        _dy: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv2dDerFilter"))
    }

    fn fused_depthwise_conv2d(
        &mut self,
        _config: FusedConv2dConfig<'_>,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("fusedDepthwiseConv2D"))
    }

    fn depthwise_conv2d(
        &mut self,
        _input: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("depthwiseConv2D"))
    }

    fn depthwise_conv2d_der_input(
        &mut self,
        _dy: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("depthwiseConv2DDerInput"))
    }

    fn depthwise_conv2d_der_filter(
        &mut self,
        _x: &TensorInfo,
        _dy: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("depthwiseConv2DDerFilter"))
    }

    fn conv3d(
        &mut self,
        _x: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv3d"))
    }

    fn conv3d_der_input(
        &mut self,
        _dy: &TensorInfo,
        _filter: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv3dDerInput"))
    }

    fn conv3d_der_filter(
        &mut self,
        _x: &TensorInfo,
        _dy: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("conv3dDerFilter"))
    }

    // Pooling

    fn max_pool(
        &mut self,
        _x: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("maxPool"))
    }

    fn max_pool_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _y: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("maxPoolBackprop"))
    }

    fn avg_pool(
        &mut self,
        _x: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("avgPool"))
    }

    fn avg_pool_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _conv_info: &Conv2dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("avgPoolBackprop"))
    }

    fn avg_pool3d(
        &mut self,
        _x: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("avgPool3d"))
    }

    fn avg_pool3d_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("avgPool3dBackprop"))
    }

    fn max_pool3d(
        &mut self,
        _x: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("maxPool3d"))
    }

    fn max_pool3d_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _y: &TensorInfo,
        _conv_info: &Conv3dInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("maxPool3dBackprop"))
    }

    // Shape manipulation

    /// Reinterprets `x` with a new shape holding the same number of elements.
    fn reshape(
        &mut self,
        _x: &TensorInfo,
        _shape: &[usize],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("reshape"))
    }

    fn cast(&mut self, _x: &TensorInfo, _dtype: DType) -> Result<TensorInfo> {
        Err(Error::unimplemented("cast"))
    }

    fn tile(&mut self, _x: &TensorInfo, _reps: &[usize]) -> Result<TensorInfo> {
        Err(Error::unimplemented("tile"))
    }

    fn pad(
        &mut self,
        _x: &TensorInfo,
        _paddings: &[(usize, usize)],
        _constant_value: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("pad"))
    }

    fn transpose(
        &mut self,
        _x: &TensorInfo,
        _perm: &[usize],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("transpose"))
    }

    fn gather(
        &mut self,
        _x: &TensorInfo,
        _indices: &TensorInfo,
        _axis: usize,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("gather"))
    }

    /// Gathers slices of `x` addressed by the innermost dimension of
    /// `indices`; see [`prepare_and_validate`](crate::gather_nd::prepare_and_validate).
    fn gather_nd(
        &mut self,
        _x: &TensorInfo,
        _indices: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("gatherND"))
    }

    fn scatter_nd(
        &mut self,
        _indices: &TensorInfo,
        _updates: &TensorInfo,
        _shape: &[usize],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("scatterND"))
    }

    fn batch_to_space_nd(
        &mut self,
        _x: &TensorInfo,
        _block_shape: &[usize],
        _crops: &[(usize, usize)],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("batchToSpaceND"))
    }

    fn space_to_batch_nd(
        &mut self,
        _x: &TensorInfo,
        _block_shape: &[usize],
        _paddings: &[(usize, usize)],
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("spaceToBatchND"))
    }

    // Resizing

    fn resize_bilinear(
        &mut self,
        _x: &TensorInfo,
        _new_height: usize,
        _new_width: usize,
        _align_corners: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("resizeBilinear"))
    }

    fn resize_bilinear_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _align_corners: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("resizeBilinearBackprop"))
    }

    fn resize_nearest_neighbor(
        &mut self,
        _x: &TensorInfo,
        _new_height: usize,
        _new_width: usize,
        _align_corners: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("resizeNearestNeighbor"))
    }

    fn resize_nearest_neighbor_backprop(
        &mut self,
        _dy: &TensorInfo,
        _x: &TensorInfo,
        _align_corners: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("resizeNearestNeighborBackprop"))
    }

    // Normalization

    fn batch_norm(
        &mut self,
        _x: &TensorInfo,
        _mean: &TensorInfo,
        _variance: &TensorInfo,
        _offset: Option<&TensorInfo>,
        _scale: Option<&TensorInfo>,
        _variance_epsilon: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("batchNorm"))
    }

    fn local_response_normalization_4d(
        &mut self,
        _x: &TensorInfo,
        _params: LrnParams,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("localResponseNormalization4D"))
    }

    fn lrn_grad(
        &mut self,
        _dy: &TensorInfo,
        _input_image: &TensorInfo,
        _output_image: &TensorInfo,
        _params: LrnParams,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("LRNGrad"))
    }

    // Sampling, encoding and detection

    fn multinomial(
        &mut self,
        _logits: &TensorInfo,
        _normalized: bool,
        _num_samples: usize,
        _seed: u64,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("multinomial"))
    }

    fn one_hot(
        &mut self,
        _indices: &TensorInfo,
        _depth: usize,
        _on_value: f32,
        _off_value: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("oneHot"))
    }

    fn cumsum(
        &mut self,
        _x: &TensorInfo,
        _axis: usize,
        _exclusive: bool,
        _reverse: bool,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("cumsum"))
    }

    fn non_max_suppression(
        &mut self,
        _boxes: &TensorInfo,
        _scores: &TensorInfo,
        _max_output_size: usize,
        _iou_threshold: f32,
        _score_threshold: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("nonMaxSuppression"))
    }

    // Complex numbers and spectral

    fn fft(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("fft"))
    }

    fn ifft(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("ifft"))
    }

    fn complex(
        &mut self,
        _real: &TensorInfo,
        _imag: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("complex"))
    }

    fn real(&mut self, _input: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("real"))
    }

    fn imag(&mut self, _input: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("imag"))
    }

    // Image and layout

    fn crop_and_resize(
        &mut self,
        _image: &TensorInfo,
        _boxes: &TensorInfo,
        _box_index: &TensorInfo,
        _crop_size: [usize; 2],
        _method: ResizeMethod,
        _extrapolation_value: f32,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("cropAndResize"))
    }

    fn depth_to_space(
        &mut self,
        _x: &TensorInfo,
        _block_size: usize,
        _data_format: DataFormat,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("depthToSpace"))
    }

    /// Splits `x` along `axis` into pieces of the given sizes, which must sum
    /// to the axis length.
    fn split(
        &mut self,
        _x: &TensorInfo,
        _size_splits: &[usize],
        _axis: usize,
    ) -> Result<Vec<TensorInfo>> {
        Err(Error::unimplemented("split"))
    }

    fn sparse_to_dense(
        &mut self,
        _sparse_indices: &TensorInfo,
        _sparse_values: &TensorInfo,
        _output_shape: &[usize],
        _default_value: &TensorInfo,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("sparseToDense"))
    }

    fn diag(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("diag"))
    }

    // Creation

    fn fill(
        &mut self,
        _shape: &[usize],
        _value: f64,
        _dtype: DType,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("fill"))
    }

    fn ones_like(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("onesLike"))
    }

    fn zeros_like(&mut self, _x: &TensorInfo) -> Result<TensorInfo> {
        Err(Error::unimplemented("zerosLike"))
    }

    fn linspace(
        &mut self,
        _start: f32,
        _stop: f32,
        _num: usize,
    ) -> Result<TensorInfo> {
        Err(Error::unimplemented("linspace"))
    }

    // Lifecycle

    /// Releases every buffer and device resource held by this backend.
    fn dispose(&mut self) -> Result<()> {
        Err(Error::unimplemented("dispose"))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "ndarray-backend")] {
        /// Dynamically configured type alias for the selected backend, based
        /// on crate feature flags.
        pub type SelectedBackend = ndarray::NdarrayBackend;
    } else {
        compile_error!(
            "A backend feature must be enabled. Available: `ndarray-backend`"
        );
    }
}
