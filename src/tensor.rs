//! In-memory tensors produced by the container decoder

use std::fmt;

use crate::error::{ContainerError, Result};
use crate::utils::shape_utils;

/// Canonical element type of a decoded tensor.
///
/// Half-precision formats are widened at load time, so only three types
/// survive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 32-bit float
    Float32,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
}

impl ElementType {
    /// Name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
        }
    }

    /// Size of one in-memory element in bytes
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
            Self::Int64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat, row-major element buffer
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Float data, including widened F16/BF16
    F32(Vec<f32>),
    /// 32-bit integer data
    I32(Vec<i32>),
    /// 64-bit integer data
    I64(Vec<i64>),
}

impl TensorData {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type held by this buffer
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::F32(_) => ElementType::Float32,
            Self::I32(_) => ElementType::Int32,
            Self::I64(_) => ElementType::Int64,
        }
    }

    /// Element at flat index `i` as `f64`
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            Self::F32(v) => v.get(i).map(|&x| f64::from(x)),
            Self::I32(v) => v.get(i).map(|&x| f64::from(x)),
            Self::I64(v) => v.get(i).map(|&x| x as f64),
        }
    }

    /// Element at flat index `i` rendered in its native type
    pub fn format_element(&self, i: usize) -> String {
        match self {
            Self::F32(v) => v.get(i).map(|x| x.to_string()),
            Self::I32(v) => v.get(i).map(|x| x.to_string()),
            Self::I64(v) => v.get(i).map(|x| x.to_string()),
        }
        .unwrap_or_default()
    }
}

/// A named, shaped, typed array. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    name: String,
    shape: Vec<usize>,
    data: TensorData,
}

impl Tensor {
    /// Build a tensor, checking the element count against the shape
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: TensorData) -> Result<Self> {
        let name = name.into();
        let expected = shape_utils::num_elements(&shape);
        if expected != Some(data.len()) {
            let size = data.element_type().size_in_bytes() as u64;
            return Err(ContainerError::ShapeMismatch {
                name,
                shape,
                expected: expected
                    .and_then(|n| (n as u64).checked_mul(size))
                    .unwrap_or(u64::MAX),
                actual: data.len() as u64 * size,
            });
        }
        Ok(Self { name, shape, data })
    }

    /// Tensor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape, outermost dimension first
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element buffer
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Canonical element type
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Total number of elements
    pub fn numel(&self) -> usize {
        self.data.len()
    }
}
