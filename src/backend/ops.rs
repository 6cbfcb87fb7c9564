//! Argument bundles and result records shared by [`KernelBackend`]
//! implementations.
//!
//! [`KernelBackend`]: crate::backend::KernelBackend

use core::time::Duration;

use crate::tensor::TensorInfo;

/// Activation applied at the end of a fused kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Relu6,
    /// Parametric relu; slopes come from `prelu_activation_weights`.
    Prelu,
    Elu,
}

/// Arguments of a fused `batch_mat_mul + bias + activation` kernel.
#[derive(Debug, Clone, Copy)]
pub struct FusedBatchMatMulConfig<'a> {
    pub a: &'a TensorInfo,
    pub b: &'a TensorInfo,
    pub transpose_a: bool,
    pub transpose_b: bool,
    pub bias: Option<&'a TensorInfo>,
    pub activation: Activation,
    /// Per-channel slopes, only read for [`Activation::Prelu`].
    pub prelu_activation_weights: Option<&'a TensorInfo>,
}

impl<'a> FusedBatchMatMulConfig<'a> {
    /// A plain, untransposed product without bias or activation.
    #[inline]
    #[must_use]
    pub const fn new(a: &'a TensorInfo, b: &'a TensorInfo) -> Self {
        Self {
            a,
            b,
            transpose_a: false,
            transpose_b: false,
            bias: None,
            activation: Activation::Linear,
            prelu_activation_weights: None,
        }
    }
}

/// Arguments of a fused `conv2d`/`depthwise_conv2d + bias + activation`
/// kernel.
#[derive(Debug, Clone, Copy)]
pub struct FusedConv2dConfig<'a> {
    pub input: &'a TensorInfo,
    pub filter: &'a TensorInfo,
    pub conv_info: &'a Conv2dInfo,
    pub bias: Option<&'a TensorInfo>,
    pub activation: Activation,
    pub prelu_activation_weights: Option<&'a TensorInfo>,
}

impl<'a> FusedConv2dConfig<'a> {
    #[inline]
    #[must_use]
    pub const fn new(
        input: &'a TensorInfo,
        filter: &'a TensorInfo,
        conv_info: &'a Conv2dInfo,
    ) -> Self {
        Self {
            input,
            filter,
            conv_info,
            bias: None,
            activation: Activation::Linear,
            prelu_activation_weights: None,
        }
    }
}

/// Memory layout of image tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    /// `[batch, height, width, channels]`.
    #[default]
    ChannelsLast,
    /// `[batch, channels, height, width]`.
    ChannelsFirst,
}

/// Explicit padding of a 2D window, in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PadInfo {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

/// Explicit padding of a 3D window, in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PadInfo3d {
    pub front: usize,
    pub back: usize,
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

/// Geometry of a 2D convolution or pooling window, resolved ahead of
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conv2dInfo {
    pub batch_size: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub in_channels: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub out_channels: usize,
    pub data_format: DataFormat,
    pub stride_height: usize,
    pub stride_width: usize,
    pub dilation_height: usize,
    pub dilation_width: usize,
    pub filter_height: usize,
    pub filter_width: usize,
    pub effective_filter_height: usize,
    pub effective_filter_width: usize,
    pub pad: PadInfo,
    pub in_shape: [usize; 4],
    pub out_shape: [usize; 4],
    pub filter_shape: [usize; 4],
}

/// Geometry of a 3D convolution or pooling window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conv3dInfo {
    pub batch_size: usize,
    pub in_depth: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub in_channels: usize,
    pub out_depth: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub out_channels: usize,
    pub data_format: DataFormat,
    pub stride_depth: usize,
    pub stride_height: usize,
    pub stride_width: usize,
    pub dilation_depth: usize,
    pub dilation_height: usize,
    pub dilation_width: usize,
    pub filter_depth: usize,
    pub filter_height: usize,
    pub filter_width: usize,
    pub effective_filter_depth: usize,
    pub effective_filter_height: usize,
    pub effective_filter_width: usize,
    pub pad: PadInfo3d,
    pub in_shape: [usize; 5],
    pub out_shape: [usize; 5],
    pub filter_shape: [usize; 5],
}

/// Scalars of local response normalization and its gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrnParams {
    pub depth_radius: usize,
    pub bias: f32,
    pub alpha: f32,
    pub beta: f32,
}

impl Default for LrnParams {
    #[inline]
    fn default() -> Self {
        Self {
            depth_radius: 5,
            bias: 1.0,
            alpha: 1.0,
            beta: 0.5,
        }
    }
}

/// Sampling used by `crop_and_resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeMethod {
    #[default]
    Bilinear,
    Nearest,
}

/// Statistics gathered while timing a closure on a backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimingInfo {
    /// Time spent executing kernels on the device.
    pub kernel: Duration,
    /// Wall-clock time, when the backend measures it separately.
    pub wall: Option<Duration>,
    pub unreliable: bool,
    pub reasons: Vec<String>,
}

/// Memory usage reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    /// Bytes held by resident buffers.
    pub num_bytes: usize,
    pub num_data_ids: usize,
    pub unreliable: bool,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::ops::{Activation, FusedBatchMatMulConfig, LrnParams},
        storage::DataId,
        tensor::{DType, TensorInfo},
    };

    #[test]
    fn fused_matmul_config_defaults_to_plain_product() {
        let a = TensorInfo::new(DataId::new(), vec![2, 3], DType::Float32);
        let b = TensorInfo::new(DataId::new(), vec![3, 4], DType::Float32);

        let config = FusedBatchMatMulConfig::new(&a, &b);

        assert!(!config.transpose_a && !config.transpose_b);
        assert!(config.bias.is_none());
        assert!(config.prelu_activation_weights.is_none());
        assert_eq!(config.activation, Activation::Linear);
    }

    #[test]
    fn fused_matmul_config_carries_optional_fields() {
        let a = TensorInfo::new(DataId::new(), vec![2, 3], DType::Float32);
        let b = TensorInfo::new(DataId::new(), vec![3, 4], DType::Float32);
        let alpha = TensorInfo::new(DataId::new(), vec![4], DType::Float32);

        let config = FusedBatchMatMulConfig {
            activation: Activation::Prelu,
            prelu_activation_weights: Some(&alpha),
            ..FusedBatchMatMulConfig::new(&a, &b)
        };

        assert_eq!(config.prelu_activation_weights, Some(&alpha));
        assert_eq!(config.a.shape(), &[2, 3]);
    }

    #[test]
    fn lrn_defaults() {
        let params = LrnParams::default();

        assert_eq!(params.depth_radius, 5);
        assert!((params.beta - 0.5).abs() < f32::EPSILON);
    }
}
