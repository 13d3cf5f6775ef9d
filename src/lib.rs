//! # tensordiff
//!
//! Compare the tensors stored in two SafeTensors checkpoints and report,
//! per tensor, whether shape, dtype and values agree within tolerance.
//!
//! ## Features
//!
//! - Manual container decoding, no memory mapping required
//! - `F32`, `F16`, `BF16`, `I32` and `I64` tensors (half formats widened to `f32`)
//! - `numpy.allclose`-style tolerance with difference statistics
//! - Unknown dtypes are skipped with a warning instead of failing the load
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tensordiff::{compare_maps, load_tensors, CompareConfig};
//!
//! let before = load_tensors("model.safetensors")?;
//! let after = load_tensors("converted.safetensors")?;
//! let report = compare_maps(&before, &after, &CompareConfig::default());
//! report.write_to(&mut std::io::stdout())?;
//! assert!(report.passed());
//! ```

// Require docs for public items
#![warn(missing_docs)]

pub mod codec;
pub mod compare;
pub mod config;
pub mod container;
pub mod error;
pub mod tensor;
pub mod utils;

// Re-exports for convenience
pub use codec::DType;
pub use compare::{compare_maps, compare_tensors, CompareReport, ComparisonResult, NamePartition, Tolerance};
pub use config::CompareConfig;
pub use container::{load_tensors, TensorMap};
pub use error::ContainerError;
pub use tensor::{ElementType, Tensor, TensorData};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
