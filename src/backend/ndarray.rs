//! [`ndarray`] crate backend.
//!
//! A host-memory reference backend. Buffers live in a
//! [`DataStore`] as flat [`BufferRecord`]s and are viewed through `ndarray`
//! when a kernel runs. It implements the full lifecycle surface and a
//! representative kernel subset; every other kernel reports
//! [`Error::Unimplemented`].

use std::{rc::Rc, time::Instant};

use futures::future::{self, LocalBoxFuture};
use log::{debug, warn};
use ndarray::{ArrayD, ArrayView2, ArrayViewD, Axis, IxDyn, Zip};
use num_traits::{Num, NumCast, Signed};

use crate::{
    backend::{
        KernelBackend,
        ops::{MemoryInfo, TimingInfo},
    },
    error::{Error, Result},
    gather_nd::{GatherNdPlan, prepare_and_validate},
    storage::{BackendId, DataId, DataMover, DataStore},
    tensor::{DType, DataValues, FloatPrecision, TensorInfo},
};

/// A buffer resident on the [`NdarrayBackend`]: row-major values plus the
/// shape they are laid out in.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    values: DataValues,
    shape: Vec<usize>,
}

impl BufferRecord {
    /// Pairs `values` with `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementCountMismatch`] if `values` does not hold
    /// exactly as many elements as `shape` describes.
    pub fn new(values: DataValues, shape: &[usize]) -> Result<Self> {
        let expected = shape.iter().product();
        if values.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape: shape.to_vec(),
                expected,
                got: values.len(),
            });
        }

        Ok(Self {
            values,
            shape: shape.to_vec(),
        })
    }

    #[inline]
    #[must_use]
    pub const fn values(&self) -> &DataValues {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    #[must_use]
    pub const fn dtype(&self) -> DType {
        self.values.dtype()
    }

    #[inline]
    #[must_use]
    pub fn into_values(self) -> DataValues {
        self.values
    }
}

#[derive(Debug, Clone, Copy)]
enum Arith {
    Add,
    Sub,
    Mul,
}

impl Arith {
    const fn kernel(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "subtract",
            Self::Mul => "multiply",
        }
    }

    fn apply<T: Num>(self, lhs: T, rhs: T) -> T {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Unary {
    Neg,
    Abs,
}

impl Unary {
    const fn kernel(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Abs => "abs",
        }
    }

    fn apply<T: Signed>(self, value: T) -> T {
        match self {
            Self::Neg => -value,
            Self::Abs => value.abs(),
        }
    }
}

/// Host-memory backend computing with [`ndarray`].
#[derive(Debug)]
pub struct NdarrayBackend {
    store: DataStore<BufferRecord>,
    precision: FloatPrecision,
    disposed: bool,
}

impl NdarrayBackend {
    /// Creates a 32-bit backend identified by `id`. Misses in its store are
    /// resolved through `mover`.
    #[inline]
    #[must_use]
    pub fn new(id: BackendId, mover: Rc<dyn DataMover<BufferRecord>>) -> Self {
        Self::with_precision(id, mover, FloatPrecision::Single)
    }

    #[inline]
    #[must_use]
    pub fn with_precision(
        id: BackendId,
        mover: Rc<dyn DataMover<BufferRecord>>,
        precision: FloatPrecision,
    ) -> Self {
        Self {
            store: DataStore::new(id, mover),
            precision,
            disposed: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> &BackendId {
        self.store.backend()
    }

    /// Whether this backend is currently authoritative for `data_id`.
    #[inline]
    #[must_use]
    pub fn owns(&self, data_id: &DataId) -> bool {
        self.store.has(data_id)
    }

    /// Hands the record for `data_id` over to the caller. This backend stops
    /// being authoritative for it. Used by movers migrating data elsewhere.
    #[inline]
    pub fn take_record(&mut self, data_id: &DataId) -> Option<BufferRecord> {
        self.store.take(data_id)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed {
                backend: self.id().clone(),
            });
        }

        Ok(())
    }

    /// Makes every tensor in `tensors` resident, migrating where needed.
    fn make_resident(&mut self, tensors: &[&TensorInfo]) -> Result<()> {
        self.ensure_alive()?;
        for tensor in tensors {
            let _record = self.store.get(tensor.data_id())?;
        }

        Ok(())
    }

    /// The resident record of `tensor`, checked against its descriptor.
    fn resident(&self, tensor: &TensorInfo) -> Result<&BufferRecord> {
        let record = self.store.peek(tensor.data_id()).ok_or_else(|| {
            Error::DataNotFound {
                backend: self.id().clone(),
            }
        })?;

        if record.shape() != tensor.shape() {
            return Err(Error::ShapeMismatch {
                expected: tensor.shape().to_vec(),
                got: record.shape().to_vec(),
            });
        }
        if record.dtype() != tensor.dtype() {
            return Err(Error::DTypeMismatch {
                expected: tensor.dtype(),
                got: record.dtype(),
            });
        }

        Ok(record)
    }

    fn register(
        &mut self,
        values: DataValues,
        shape: Vec<usize>,
    ) -> Result<TensorInfo> {
        let dtype = values.dtype();
        let data_id = self.write(values, &shape)?;

        Ok(TensorInfo::new(data_id, shape, dtype))
    }

    fn binary(
        &mut self,
        op: Arith,
        a: &TensorInfo,
        b: &TensorInfo,
    ) -> Result<TensorInfo> {
        self.make_resident(&[a, b])?;
        let lhs = self.resident(a)?;
        let rhs = self.resident(b)?;

        if lhs.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch {
                expected: lhs.shape().to_vec(),
                got: rhs.shape().to_vec(),
            });
        }
        let shape = lhs.shape().to_vec();

        let values = match (lhs.values(), rhs.values()) {
            (&DataValues::Float32(ref l), &DataValues::Float32(ref r)) => {
                DataValues::Float32(zip_with(l, r, &shape, |x, y| {
                    op.apply(x, y)
                })?)
            }
            (&DataValues::Int32(ref l), &DataValues::Int32(ref r)) => {
                DataValues::Int32(zip_with(l, r, &shape, |x, y| op.apply(x, y))?)
            }
            (l, r) if l.dtype() != r.dtype() => {
                return Err(Error::DTypeMismatch {
                    expected: l.dtype(),
                    got: r.dtype(),
                });
            }
            (l, _) => {
                return Err(Error::UnsupportedDType {
                    kernel: op.kernel(),
                    dtype: l.dtype(),
                });
            }
        };

        self.register(values, shape)
    }

    fn unary(&mut self, op: Unary, x: &TensorInfo) -> Result<TensorInfo> {
        self.make_resident(&[x])?;
        let record = self.resident(x)?;

        let values = match *record.values() {
            DataValues::Float32(ref values) => DataValues::Float32(
                values.iter().map(|&value| op.apply(value)).collect(),
            ),
            DataValues::Int32(ref values) => DataValues::Int32(
                values.iter().map(|&value| op.apply(value)).collect(),
            ),
            ref other => {
                return Err(Error::UnsupportedDType {
                    kernel: op.kernel(),
                    dtype: other.dtype(),
                });
            }
        };
        let shape = record.shape().to_vec();

        self.register(values, shape)
    }
}

fn view<'a, T>(values: &'a [T], shape: &[usize]) -> Result<ArrayViewD<'a, T>> {
    ArrayViewD::from_shape(IxDyn(shape), values).map_err(|_| {
        Error::ElementCountMismatch {
            shape: shape.to_vec(),
            expected: shape.iter().product(),
            got: values.len(),
        }
    })
}

fn zip_with<T, U, F>(
    lhs: &[T],
    rhs: &[T],
    shape: &[usize],
    f: F,
) -> Result<Vec<U>>
where
    T: Copy,
    U: Clone,
    F: Fn(T, T) -> U,
{
    let lhs = view(lhs, shape)?;
    let rhs = view(rhs, shape)?;

    Ok(Zip::from(&lhs)
        .and(&rhs)
        .map_collect(|&l, &r| f(l, r))
        .iter()
        .cloned()
        .collect())
}

/// Sums `values` over `axes`, given in descending order.
fn sum_axes<T>(
    values: &[T],
    shape: &[usize],
    axes: &[usize],
) -> Result<(Vec<T>, Vec<usize>)>
where
    T: Clone + Num,
{
    let mut array: ArrayD<T> = view(values, shape)?.to_owned();
    for &axis in axes {
        array = array.sum_axis(Axis(axis));
    }

    Ok((array.iter().cloned().collect(), array.shape().to_vec()))
}

/// Copies the rows selected by `rows` out of `values` viewed as
/// `[values.len() / row_len, row_len]`.
fn select_rows<T: Clone>(
    values: &[T],
    row_len: usize,
    rows: &[usize],
) -> Result<Vec<T>> {
    let num_rows = values.len().checked_div(row_len).unwrap_or(0);
    let table = ArrayView2::from_shape((num_rows, row_len), values).map_err(
        |_| Error::ElementCountMismatch {
            shape: vec![num_rows, row_len],
            expected: num_rows * row_len,
            got: values.len(),
        },
    )?;

    Ok(table.select(Axis(0), rows).iter().cloned().collect())
}

/// Resolves every index tuple of a gather to the row it selects, with the
/// source viewed as `[size / slice_size, slice_size]`.
fn slice_rows(
    plan: &GatherNdPlan,
    indices: &[i32],
    input_shape: &[usize],
) -> Result<Vec<usize>> {
    let slice_rank = plan.slice_rank();

    (0..plan.num_updates)
        .map(|update| {
            let tuple = &indices[update * slice_rank..(update + 1) * slice_rank];
            tuple.iter().zip(&plan.strides).zip(input_shape).try_fold(
                0,
                |row, ((&index, &stride), &dim)| {
                    usize::try_from(index)
                        .ok()
                        .filter(|&index| index < dim)
                        .map(|index| row + index * stride)
                        .ok_or_else(|| Error::IndexOutOfBounds {
                            index: tuple.to_vec(),
                            shape: input_shape.to_vec(),
                        })
                },
            )
        })
        .collect()
}

fn splat<T: NumCast + Clone>(
    value: f64,
    len: usize,
    dtype: DType,
) -> Result<Vec<T>> {
    let value = <T as NumCast>::from(value)
        .ok_or(Error::UnrepresentableValue { value, dtype })?;

    Ok(vec![value; len])
}

impl KernelBackend for NdarrayBackend {
    fn time(
        &mut self,
        f: &mut dyn FnMut(&mut dyn KernelBackend) -> Result<()>,
    ) -> Result<TimingInfo> {
        self.ensure_alive()?;
        let start = Instant::now();
        f(self)?;

        Ok(TimingInfo {
            kernel: start.elapsed(),
            ..TimingInfo::default()
        })
    }

    fn read(
        &mut self,
        data_id: &DataId,
    ) -> LocalBoxFuture<'_, Result<DataValues>> {
        // Host buffers have no pending device work.
        Box::pin(future::ready(self.read_sync(data_id)))
    }

    fn read_sync(&mut self, data_id: &DataId) -> Result<DataValues> {
        self.ensure_alive()?;

        Ok(self.store.get(data_id)?.values().clone())
    }

    fn num_data_ids(&self) -> Result<usize> {
        Ok(self.store.num_data_ids())
    }

    fn dispose_data(&mut self, data_id: &DataId) -> Result<bool> {
        Ok(self.store.delete(data_id))
    }

    fn write(&mut self, values: DataValues, shape: &[usize]) -> Result<DataId> {
        self.ensure_alive()?;
        let record = BufferRecord::new(values, shape)?;
        let data_id = DataId::new();
        let _previous = self.store.set(&data_id, record);

        Ok(data_id)
    }

    fn move_data(
        &mut self,
        data_id: &DataId,
        values: DataValues,
        shape: &[usize],
    ) -> Result<()> {
        self.ensure_alive()?;
        let record = BufferRecord::new(values, shape)?;
        let _previous = self.store.set(data_id, record);

        Ok(())
    }

    fn memory(&self) -> Result<MemoryInfo> {
        let num_data_ids = self.store.num_data_ids();
        let mut info = MemoryInfo {
            num_bytes: self
                .store
                .records()
                .map(|record| record.values().byte_len())
                .sum(),
            num_data_ids,
            ..MemoryInfo::default()
        };

        if num_data_ids != self.store.len() {
            warn!(
                "`{}` counts {num_data_ids} live handles but retains {}",
                self.id(),
                self.store.len()
            );
            info.unreliable = true;
            info.reasons.push(format!(
                "{} handles were reclaimed without being disposed",
                num_data_ids.saturating_sub(self.store.len())
            ));
        }

        Ok(info)
    }

    fn float_precision(&self) -> Result<FloatPrecision> {
        Ok(self.precision)
    }

    fn neg(&mut self, x: &TensorInfo) -> Result<TensorInfo> {
        self.unary(Unary::Neg, x)
    }

    fn add(&mut self, a: &TensorInfo, b: &TensorInfo) -> Result<TensorInfo> {
        self.binary(Arith::Add, a, b)
    }

    fn subtract(
        &mut self,
        a: &TensorInfo,
        b: &TensorInfo,
    ) -> Result<TensorInfo> {
        self.binary(Arith::Sub, a, b)
    }

    fn multiply(
        &mut self,
        a: &TensorInfo,
        b: &TensorInfo,
    ) -> Result<TensorInfo> {
        self.binary(Arith::Mul, a, b)
    }

    fn sum(&mut self, x: &TensorInfo, axes: &[usize]) -> Result<TensorInfo> {
        if let Some(&axis) = axes.iter().find(|&&axis| axis >= x.rank()) {
            return Err(Error::AxisOutOfRange {
                axis,
                rank: x.rank(),
            });
        }
        let mut axes = axes.to_vec();
        axes.sort_unstable_by(|a, b| b.cmp(a));
        axes.dedup();

        self.make_resident(&[x])?;
        let record = self.resident(x)?;
        let (values, shape) = match *record.values() {
            DataValues::Float32(ref values) => {
                let (sum, shape) = sum_axes(values, record.shape(), &axes)?;
                (DataValues::Float32(sum), shape)
            }
            DataValues::Int32(ref values) => {
                let (sum, shape) = sum_axes(values, record.shape(), &axes)?;
                (DataValues::Int32(sum), shape)
            }
            ref other => {
                return Err(Error::UnsupportedDType {
                    kernel: "sum",
                    dtype: other.dtype(),
                });
            }
        };

        self.register(values, shape)
    }

    fn abs(&mut self, x: &TensorInfo) -> Result<TensorInfo> {
        self.unary(Unary::Abs, x)
    }

    fn reshape(
        &mut self,
        x: &TensorInfo,
        shape: &[usize],
    ) -> Result<TensorInfo> {
        let expected: usize = shape.iter().product();
        if expected != x.size() {
            return Err(Error::ElementCountMismatch {
                shape: shape.to_vec(),
                expected,
                got: x.size(),
            });
        }

        self.make_resident(&[x])?;
        let values = self.resident(x)?.values().clone();

        self.register(values, shape.to_vec())
    }

    fn gather_nd(
        &mut self,
        x: &TensorInfo,
        indices: &TensorInfo,
    ) -> Result<TensorInfo> {
        let plan = prepare_and_validate(x.descriptor(), indices.descriptor())?;

        self.make_resident(&[x, indices])?;
        let source = self.resident(x)?;
        let DataValues::Int32(ref index_values) = *self.resident(indices)?.values()
        else {
            return Err(Error::DTypeMismatch {
                expected: DType::Int32,
                got: indices.dtype(),
            });
        };

        let rows = slice_rows(&plan, index_values, source.shape())?;
        let values = match *source.values() {
            DataValues::Float32(ref values) => {
                DataValues::Float32(select_rows(values, plan.slice_size, &rows)?)
            }
            DataValues::Int32(ref values) => {
                DataValues::Int32(select_rows(values, plan.slice_size, &rows)?)
            }
            DataValues::Bool(ref values) => {
                DataValues::Bool(select_rows(values, plan.slice_size, &rows)?)
            }
            DataValues::Complex64(ref values) => DataValues::Complex64(
                select_rows(values, plan.slice_size * 2, &rows)?,
            ),
        };

        self.register(values, plan.result_shape)
    }

    fn fill(
        &mut self,
        shape: &[usize],
        value: f64,
        dtype: DType,
    ) -> Result<TensorInfo> {
        let len = shape.iter().product();
        let values = match dtype {
            DType::Float32 => DataValues::Float32(splat(value, len, dtype)?),
            DType::Int32 => DataValues::Int32(splat(value, len, dtype)?),
            DType::Bool => DataValues::Bool(vec![value != 0.0; len]),
            DType::Complex64 => {
                let real = splat::<f32>(value, 1, dtype)?[0];
                DataValues::Complex64([real, 0.0].repeat(len))
            }
        };

        self.register(values, shape.to_vec())
    }

    fn ones_like(&mut self, x: &TensorInfo) -> Result<TensorInfo> {
        self.fill(x.shape(), 1.0, x.dtype())
    }

    fn zeros_like(&mut self, x: &TensorInfo) -> Result<TensorInfo> {
        self.fill(x.shape(), 0.0, x.dtype())
    }

    fn dispose(&mut self) -> Result<()> {
        if !self.disposed {
            let released = self.store.clear();
            debug!("disposed `{}`, released {released} buffers", self.id());
            self.disposed = true;
        }

        Ok(())
    }
}
