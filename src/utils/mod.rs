//! Utility functions and helpers for tensordiff
//!
//! This module provides common utilities used across the crate.

/// Shape utilities
pub mod shape_utils {
    /// Number of elements for a shape (1 for a scalar)
    ///
    /// Returns `None` if the product overflows `usize`.
    pub fn num_elements(shape: &[usize]) -> Option<usize> {
        shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Convert a flat row-major index to a multi-dimensional coordinate
    ///
    /// The last dimension varies fastest.
    pub fn unravel_index(mut flat: usize, shape: &[usize]) -> Vec<usize> {
        let mut coord = vec![0; shape.len()];
        for (axis, &dim) in shape.iter().enumerate().rev() {
            if dim == 0 {
                continue;
            }
            coord[axis] = flat % dim;
            flat /= dim;
        }
        coord
    }

    /// Render a shape or coordinate as `[a, b, c]`
    pub fn format_dims(dims: &[usize]) -> String {
        let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }
}
