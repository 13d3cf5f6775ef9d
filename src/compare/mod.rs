//! Tensor comparison between two containers
//!
//! - Element-wise closeness checks with configurable tolerance
//! - Three-way partition of tensor names
//! - Report assembly and rendering

mod comparator;
mod partition;
mod report;

pub use comparator::{compare_tensors, is_close, ComparisonResult, Tolerance, ValueStats};
pub use partition::NamePartition;
pub use report::{compare_maps, CompareReport};
