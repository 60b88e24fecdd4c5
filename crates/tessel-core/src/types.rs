//! Core types for value types, constant payloads, and operation attributes.

use std::fmt;

use crate::permutation::is_permutation;
use crate::{Error, Result};

/// Element type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F32,
    F16,
    I64,
    I32,
    Bool,
    U8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::F32 => "fp32",
            DataType::F16 => "fp16",
            DataType::I64 => "int64",
            DataType::I32 => "int32",
            DataType::Bool => "bool",
            DataType::U8 => "uint8",
        };
        f.write_str(name)
    }
}

/// Tensor shape, either fully static or not yet inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorShape {
    /// All dimensions are known.
    Static(Vec<usize>),

    /// Shape has not been inferred (or could not be).
    Unknown,
}

impl TensorShape {
    /// Check if the shape is fully static.
    pub fn is_static(&self) -> bool {
        matches!(self, TensorShape::Static(_))
    }

    /// Get static dimensions if available.
    pub fn as_static(&self) -> Option<&[usize]> {
        match self {
            TensorShape::Static(dims) => Some(dims),
            TensorShape::Unknown => None,
        }
    }

    /// Number of dimensions, if known.
    pub fn ndim(&self) -> Option<usize> {
        self.as_static().map(|dims| dims.len())
    }
}

/// The type of a value: element type plus shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueType {
    pub dtype: DataType,
    pub shape: TensorShape,
}

impl ValueType {
    /// Create a statically shaped value type.
    pub fn new(dtype: DataType, dims: Vec<usize>) -> Self {
        Self {
            dtype,
            shape: TensorShape::Static(dims),
        }
    }

    /// Create a value type whose shape is not known yet.
    pub fn unknown(dtype: DataType) -> Self {
        Self {
            dtype,
            shape: TensorShape::Unknown,
        }
    }

    /// Rank of the value, if known.
    pub fn rank(&self) -> Option<usize> {
        self.shape.ndim()
    }

    /// The type produced by transposing a value of this type with `perm`.
    ///
    /// Falls back to an unknown shape when the rank does not match `perm`.
    pub fn transposed(&self, perm: &[usize]) -> ValueType {
        match self.shape.as_static() {
            Some(dims) if is_permutation(perm, dims.len()) => {
                ValueType::new(self.dtype, perm.iter().map(|&p| dims[p]).collect())
            }
            _ => ValueType::unknown(self.dtype),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            TensorShape::Static(dims) => {
                let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "{}[{}]", self.dtype, dims.join(","))
            }
            TensorShape::Unknown => write!(f, "{}[?]", self.dtype),
        }
    }
}

/// Raw element storage for constant payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    I64(Vec<i64>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    Bool(Vec<bool>),
    U8(Vec<u8>),
}

impl TensorData {
    /// Get the number of elements in this tensor data.
    pub fn len(&self) -> usize {
        match self {
            TensorData::I64(v) => v.len(),
            TensorData::I32(v) => v.len(),
            TensorData::F32(v) => v.len(),
            TensorData::Bool(v) => v.len(),
            TensorData::U8(v) => v.len(),
        }
    }

    /// Check if this tensor data is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to get as i64 slice.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            TensorData::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as f32 slice.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            TensorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as bool slice.
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            TensorData::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Get the inferred data type from this tensor data.
    pub fn dtype(&self) -> DataType {
        match self {
            TensorData::I64(_) => DataType::I64,
            TensorData::I32(_) => DataType::I32,
            TensorData::F32(_) => DataType::F32,
            TensorData::Bool(_) => DataType::Bool,
            TensorData::U8(_) => DataType::U8,
        }
    }

    /// Pick elements by flat index, in the given order.
    fn gather(&self, indices: &[usize]) -> TensorData {
        fn pick<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i]).collect()
        }
        match self {
            TensorData::I64(v) => TensorData::I64(pick(v, indices)),
            TensorData::I32(v) => TensorData::I32(pick(v, indices)),
            TensorData::F32(v) => TensorData::F32(pick(v, indices)),
            TensorData::Bool(v) => TensorData::Bool(pick(v, indices)),
            TensorData::U8(v) => TensorData::U8(pick(v, indices)),
        }
    }
}

/// A tensor value known at compile time (the payload of a `const` op).
#[derive(Debug, Clone, PartialEq)]
pub struct TensorValue {
    /// The raw tensor data.
    pub data: TensorData,

    /// The shape of the tensor (dimensions).
    pub shape: Vec<usize>,

    /// The data type of the tensor.
    pub dtype: DataType,
}

impl TensorValue {
    /// Create a new TensorValue with data and shape.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the shape product.
    pub fn new(data: TensorData, shape: Vec<usize>) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?} (product = {})",
            data.len(),
            shape,
            expected_len
        );
        let dtype = data.dtype();
        Self { data, shape, dtype }
    }

    /// Create a scalar TensorValue (shape = []).
    pub fn scalar(data: TensorData) -> Self {
        Self::new(data, vec![])
    }

    /// Create a rank-1 int64 tensor.
    pub fn from_i64s(values: Vec<i64>) -> Self {
        let len = values.len();
        Self::new(TensorData::I64(values), vec![len])
    }

    /// Get the number of elements in this tensor value.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this tensor value is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The value type describing this payload.
    pub fn value_type(&self) -> ValueType {
        ValueType::new(self.dtype, self.shape.clone())
    }

    /// Try to get as i64 slice.
    pub fn as_i64(&self) -> Option<&[i64]> {
        self.data.as_i64()
    }

    /// Try to get as f32 slice.
    pub fn as_f32(&self) -> Option<&[f32]> {
        self.data.as_f32()
    }

    /// Read integer elements (int64 or int32) widened to i64.
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match &self.data {
            TensorData::I64(v) => Some(v.clone()),
            TensorData::I32(v) => Some(v.iter().map(|&x| x as i64).collect()),
            _ => None,
        }
    }

    /// Read a scalar (or single element) boolean.
    pub fn as_scalar_bool(&self) -> Option<bool> {
        match self.data.as_bool() {
            Some([b]) => Some(*b),
            _ => None,
        }
    }

    /// Create a new TensorValue with a different shape (data unchanged).
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Self> {
        let len: usize = new_shape.iter().product();
        if len != self.len() {
            return Err(Error::Shape(format!(
                "Cannot reshape {:?} ({} elements) to {:?}",
                self.shape,
                self.len(),
                new_shape
            )));
        }
        Ok(Self {
            data: self.data.clone(),
            shape: new_shape,
            dtype: self.dtype,
        })
    }

    /// Physically permute the axes of this value.
    ///
    /// Output axis `i` is input axis `perm[i]`.
    pub fn transpose(&self, perm: &[usize]) -> Result<Self> {
        let rank = self.ndim();
        if !is_permutation(perm, rank) {
            return Err(Error::Shape(format!(
                "Permutation {:?} is invalid for a rank {} tensor",
                perm, rank
            )));
        }

        let mut in_strides = vec![1usize; rank];
        for axis in (0..rank.saturating_sub(1)).rev() {
            in_strides[axis] = in_strides[axis + 1] * self.shape[axis + 1];
        }
        let out_shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();

        let mut indices: Vec<usize> = Vec::with_capacity(self.len());
        let mut counter = vec![0usize; rank];
        for _ in 0..self.len() {
            indices.push(
                counter
                    .iter()
                    .zip(perm)
                    .map(|(&c, &p)| c * in_strides[p])
                    .sum(),
            );
            for axis in (0..rank).rev() {
                counter[axis] += 1;
                if counter[axis] < out_shape[axis] {
                    break;
                }
                counter[axis] = 0;
            }
        }

        Ok(Self {
            data: self.data.gather(&indices),
            shape: out_shape,
            dtype: self.dtype,
        })
    }
}

impl fmt::Display for TensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            TensorData::I64(v) => write!(f, "{:?}", v),
            TensorData::I32(v) => write!(f, "{:?}", v),
            TensorData::F32(v) => write!(f, "{:?}", v),
            TensorData::Bool(v) => write!(f, "{:?}", v),
            TensorData::U8(v) => write!(f, "{:?}", v),
        }
    }
}

/// A scalar operation attribute (e.g. a pad mode or a keep-dims flag).
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Float(f32),
    String(String),
    Bool(bool),
    Ints(Vec<i64>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::String(v) => write!(f, "\"{v}\""),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Ints(v) => write!(f, "{v:?}"),
        }
    }
}
