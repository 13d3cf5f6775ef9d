//! Dtype tags recognized in container headers

use std::fmt;

use crate::tensor::ElementType;

/// Element encoding declared by a header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// IEEE-754 single precision
    F32,
    /// IEEE-754 half precision
    F16,
    /// Brain float: float32 truncated to its top 16 bits
    BF16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
}

impl DType {
    /// Parse a header tag. Unrecognized tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "F32" => Some(Self::F32),
            "F16" => Some(Self::F16),
            "BF16" => Some(Self::BF16),
            "I32" => Some(Self::I32),
            "I64" => Some(Self::I64),
            _ => None,
        }
    }

    /// Header tag for this dtype
    pub fn tag(&self) -> &'static str {
        match self {
            Self::F32 => "F32",
            Self::F16 => "F16",
            Self::BF16 => "BF16",
            Self::I32 => "I32",
            Self::I64 => "I64",
        }
    }

    /// Size of one element in bytes
    pub fn element_size(&self) -> usize {
        match self {
            Self::F16 | Self::BF16 => 2,
            Self::F32 | Self::I32 => 4,
            Self::I64 => 8,
        }
    }

    /// In-memory element type after decoding
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::F32 | Self::F16 | Self::BF16 => ElementType::Float32,
            Self::I32 => ElementType::Int32,
            Self::I64 => ElementType::Int64,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
