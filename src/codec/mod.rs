//! Numeric codec
//!
//! Turns raw little-endian byte spans into typed element buffers:
//! - `F32`, `I32`, `I64` are read as-is
//! - `F16` and `BF16` are widened to `f32`

mod convert;
mod dtype;

pub use convert::{bf16_to_f32, decode, f16_to_f32};
pub use dtype::DType;
