//! Per-tensor comparison with tolerance

use tracing::debug;

use crate::config::{DEFAULT_ATOL, DEFAULT_RTOL};
use crate::tensor::{ElementType, Tensor};
use crate::utils::shape_utils::{format_dims, unravel_index};

/// Closeness tolerance: `|a - b| <= atol + rtol * |b|`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Relative tolerance, scaled by the second value
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

/// Check whether `a` is close to the reference value `b`.
///
/// Equal values are always close, including equal infinities. NaN is only
/// close to NaN.
pub fn is_close(a: f64, b: f64, tol: Tolerance) -> bool {
    if a == b {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    (a - b).abs() <= tol.atol + tol.rtol * b.abs()
}

/// Absolute difference used for statistics; NaN against a number counts as infinite
fn abs_diff(a: f64, b: f64) -> f64 {
    if a == b || (a.is_nan() && b.is_nan()) {
        return 0.0;
    }
    let diff = (a - b).abs();
    if diff.is_nan() {
        f64::INFINITY
    } else {
        diff
    }
}

/// Statistics recorded when values are not all close
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStats {
    /// Largest absolute difference
    pub max_abs_diff: f64,
    /// Mean absolute difference over all elements
    pub mean_abs_diff: f64,
    /// Coordinate of the largest difference
    pub max_index: Vec<usize>,
    /// First tensor's value at `max_index`
    pub first_value: String,
    /// Second tensor's value at `max_index`
    pub second_value: String,
    /// Number of elements that are not close
    pub num_different: usize,
    /// Total number of elements
    pub total_elements: usize,
}

impl ValueStats {
    /// Share of non-close elements, in percent
    pub fn percent_different(&self) -> f64 {
        if self.total_elements == 0 {
            return 0.0;
        }
        100.0 * self.num_different as f64 / self.total_elements as f64
    }
}

/// Verdict for one tensor name present in both files
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Tensor name
    pub name: String,
    /// Overall verdict: all three checks passed
    pub matched: bool,
    /// Shapes are identical
    pub shape_match: bool,
    /// Element types are identical
    pub dtype_match: bool,
    /// Values are close, or were not compared because shapes differ
    pub values_match: bool,
    /// Shape in the first file
    pub first_shape: Vec<usize>,
    /// Shape in the second file
    pub second_shape: Vec<usize>,
    /// Element type in the first file
    pub first_dtype: ElementType,
    /// Element type in the second file
    pub second_dtype: ElementType,
    /// Difference statistics, present when values differ
    pub stats: Option<ValueStats>,
    /// Human-readable diagnostics
    pub messages: Vec<String>,
}

/// Compare two tensors sharing a name.
///
/// Shape and dtype are checked independently. Values are only compared
/// when shapes are equal; a dtype mismatch does not suppress them.
pub fn compare_tensors(first: &Tensor, second: &Tensor, tol: Tolerance) -> ComparisonResult {
    let mut result = ComparisonResult {
        name: first.name().to_string(),
        matched: true,
        shape_match: true,
        dtype_match: true,
        values_match: true,
        first_shape: first.shape().to_vec(),
        second_shape: second.shape().to_vec(),
        first_dtype: first.element_type(),
        second_dtype: second.element_type(),
        stats: None,
        messages: Vec::new(),
    };

    if first.shape() != second.shape() {
        result.matched = false;
        result.shape_match = false;
        result.messages.push(format!(
            "Shape mismatch: {} vs {}",
            format_dims(first.shape()),
            format_dims(second.shape())
        ));
    }

    if first.element_type() != second.element_type() {
        result.matched = false;
        result.dtype_match = false;
        result.messages.push(format!(
            "Dtype mismatch: {} vs {}",
            first.element_type(),
            second.element_type()
        ));
    }

    if result.shape_match {
        if let Some(stats) = compare_values(first, second, tol) {
            result.matched = false;
            result.values_match = false;
            result.messages.push(format!(
                "Values differ: max_diff={}, mean_diff={}",
                format_sci(stats.max_abs_diff),
                format_sci(stats.mean_abs_diff)
            ));
            result.messages.push(format!(
                "Max diff at index {}: {} vs {}",
                format_dims(&stats.max_index),
                stats.first_value,
                stats.second_value
            ));
            result.messages.push(format!(
                "Different elements: {}/{} ({:.2}%)",
                stats.num_different,
                stats.total_elements,
                stats.percent_different()
            ));
            result.stats = Some(stats);
        }
    } else {
        debug!("{}: shapes differ, skipping value comparison", result.name);
    }

    result
}

/// Scientific notation with six decimals and a signed, two-digit exponent
/// (`5.000000e-01`)
fn format_sci(value: f64) -> String {
    let text = format!("{:.6e}", value);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Element-wise comparison of equally shaped tensors.
///
/// Returns `None` when every element is close.
fn compare_values(first: &Tensor, second: &Tensor, tol: Tolerance) -> Option<ValueStats> {
    let (a, b) = (first.data(), second.data());
    let total_elements = a.len().min(b.len());

    let mut max_diff = 0.0f64;
    let mut max_flat = 0usize;
    let mut sum_diff = 0.0f64;
    let mut num_different = 0usize;

    for i in 0..total_elements {
        let (Some(x), Some(y)) = (a.get_f64(i), b.get_f64(i)) else {
            break;
        };
        let diff = abs_diff(x, y);
        if diff > max_diff {
            max_diff = diff;
            max_flat = i;
        }
        sum_diff += diff;

        if !is_close(x, y, tol) {
            num_different += 1;
        }
    }

    if num_different == 0 {
        return None;
    }

    Some(ValueStats {
        max_abs_diff: max_diff,
        mean_abs_diff: sum_diff / total_elements as f64,
        max_index: unravel_index(max_flat, first.shape()),
        first_value: first.data().format_element(max_flat),
        second_value: second.data().format_element(max_flat),
        num_different,
        total_elements,
    })
}
