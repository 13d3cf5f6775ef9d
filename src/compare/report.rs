//! Comparison report across two tensor maps

use std::io::{self, Write};

use tracing::{debug, info};

use super::comparator::{compare_tensors, ComparisonResult};
use super::partition::NamePartition;
use crate::config::CompareConfig;
use crate::container::{SkippedTensor, TensorMap};
use crate::utils::shape_utils::format_dims;

const RULE_WIDTH: usize = 80;

/// Outcome of comparing two tensor maps
#[derive(Debug, Clone)]
pub struct CompareReport {
    /// Name partition of the two maps
    pub partition: NamePartition,
    /// One result per common name, in name order
    pub results: Vec<ComparisonResult>,
    /// Unknown-dtype entries skipped in the first file
    pub skipped_first: Vec<SkippedTensor>,
    /// Unknown-dtype entries skipped in the second file
    pub skipped_second: Vec<SkippedTensor>,
    max_listed: usize,
}

/// Compare every tensor name shared by `first` and `second`
pub fn compare_maps(first: &TensorMap, second: &TensorMap, config: &CompareConfig) -> CompareReport {
    let partition = NamePartition::new(first.names(), second.names());
    let tol = config.tolerance();

    info!(
        "Comparing {} common tensors (rtol={:e}, atol={:e})",
        partition.common.len(),
        tol.rtol,
        tol.atol
    );

    let results: Vec<ComparisonResult> = partition
        .common
        .iter()
        .filter_map(|name| Some((first.get(name)?, second.get(name)?)))
        .map(|(a, b)| {
            let result = compare_tensors(a, b, tol);
            if !result.matched {
                debug!("{}: {}", result.name, result.messages.join("; "));
            }
            result
        })
        .collect();

    CompareReport {
        partition,
        results,
        skipped_first: first.skipped().to_vec(),
        skipped_second: second.skipped().to_vec(),
        max_listed: config.max_listed,
    }
}

impl CompareReport {
    /// Number of common tensors that matched
    pub fn num_matching(&self) -> usize {
        self.results.iter().filter(|r| r.matched).count()
    }

    /// Number of common tensors that did not match
    pub fn num_mismatching(&self) -> usize {
        self.results.len() - self.num_matching()
    }

    /// Every common tensor matched, at least one was compared, and no name
    /// is unique to either file
    pub fn passed(&self) -> bool {
        !self.results.is_empty()
            && self.results.iter().all(|r| r.matched)
            && self.partition.is_balanced()
    }

    /// Render the human-readable report
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let partition = &self.partition;

        writeln!(out, "Tensor name comparison:")?;
        writeln!(out, "  Common tensors: {}", partition.common.len())?;
        writeln!(out, "  Only in file 1: {}", partition.only_in_first.len())?;
        writeln!(out, "  Only in file 2: {}", partition.only_in_second.len())?;
        writeln!(out)?;

        self.write_name_list(out, "Tensors only in file 1:", &partition.only_in_first)?;
        self.write_name_list(out, "Tensors only in file 2:", &partition.only_in_second)?;
        write_skipped(out, 1, &self.skipped_first)?;
        write_skipped(out, 2, &self.skipped_second)?;

        if self.results.is_empty() {
            writeln!(out, "No common tensors to compare!")?;
            return Ok(());
        }

        writeln!(out, "Comparing {} common tensors:", self.results.len())?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        for result in &self.results {
            if result.matched {
                writeln!(
                    out,
                    "✓ {}: MATCH (shape={}, dtype={})",
                    result.name,
                    format_dims(&result.first_shape),
                    result.first_dtype
                )?;
            } else {
                writeln!(out, "✗ {}: MISMATCH", result.name)?;
                for msg in &result.messages {
                    writeln!(out, "    {}", msg)?;
                }
            }
        }

        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out)?;

        let total = self.results.len();
        writeln!(out, "Summary:")?;
        writeln!(out, "  Matching tensors: {}/{}", self.num_matching(), total)?;
        writeln!(out, "  Mismatching tensors: {}/{}", self.num_mismatching(), total)?;
        writeln!(out)?;

        if self.passed() {
            writeln!(out, "✓ All tensors match perfectly!")?;
        } else {
            writeln!(out, "✗ Some tensors differ or are missing")?;
        }

        Ok(())
    }

    fn write_name_list<W: Write>(&self, out: &mut W, title: &str, names: &[String]) -> io::Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        let shown = if self.max_listed == 0 {
            names.len()
        } else {
            self.max_listed.min(names.len())
        };

        writeln!(out, "{}", title)?;
        for name in &names[..shown] {
            writeln!(out, "  - {}", name)?;
        }
        if shown < names.len() {
            writeln!(out, "  ... and {} more", names.len() - shown)?;
        }
        writeln!(out)
    }
}

fn write_skipped<W: Write>(out: &mut W, file_no: usize, skipped: &[SkippedTensor]) -> io::Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }

    writeln!(out, "Tensors skipped in file {} (unknown dtype):", file_no)?;
    for s in skipped {
        writeln!(out, "  - {} ({})", s.name, s.dtype)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Tensor, TensorData};

    fn map(names_values: &[(&str, f32)]) -> TensorMap {
        TensorMap::from_tensors(
            "mem.safetensors",
            names_values
                .iter()
                .map(|&(n, v)| Tensor::new(n, vec![1], TensorData::F32(vec![v])).unwrap()),
        )
    }

    fn render(report: &CompareReport) -> String {
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_identical_maps_pass() {
        let a = map(&[("w1", 1.0), ("w2", 2.0)]);
        let report = compare_maps(&a, &a, &CompareConfig::default());

        assert!(report.passed());
        assert_eq!(report.num_matching(), 2);
        let text = render(&report);
        assert!(text.contains("✓ w1: MATCH (shape=[1], dtype=float32)"));
        assert!(text.contains("✓ All tensors match perfectly!"));
    }

    #[test]
    fn test_unique_names_fail_even_when_common_match() {
        let a = map(&[("w1", 1.0), ("w2", 2.0)]);
        let b = map(&[("w2", 2.0), ("w3", 3.0)]);
        let report = compare_maps(&a, &b, &CompareConfig::default());

        assert_eq!(report.partition.common, vec!["w2"]);
        assert_eq!(report.num_matching(), 1);
        assert!(!report.passed());

        let text = render(&report);
        assert!(text.contains("Tensors only in file 1:\n  - w1\n"));
        assert!(text.contains("Tensors only in file 2:\n  - w3\n"));
        assert!(text.contains("✗ Some tensors differ or are missing"));
    }

    #[test]
    fn test_mismatch_messages_indented() {
        let a = map(&[("w", 1.0)]);
        let b = map(&[("w", 2.0)]);
        let report = compare_maps(&a, &b, &CompareConfig::default());

        assert!(!report.passed());
        assert_eq!(report.num_mismatching(), 1);
        let text = render(&report);
        assert!(text.contains("✗ w: MISMATCH\n    Values differ:"));
        assert!(text.contains("  Mismatching tensors: 1/1"));
    }

    #[test]
    fn test_no_common_tensors() {
        let a = map(&[("a", 1.0)]);
        let b = map(&[("b", 1.0)]);
        let report = compare_maps(&a, &b, &CompareConfig::default());

        assert!(report.results.is_empty());
        assert!(!report.passed());
        assert!(render(&report).ends_with("No common tensors to compare!\n"));
    }

    #[test]
    fn test_empty_maps_do_not_pass() {
        let a = map(&[]);
        let report = compare_maps(&a, &a, &CompareConfig::default());
        assert!(!report.passed());
    }

    #[test]
    fn test_max_listed_truncates_name_lists() {
        let a = map(&[("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 1.0)]);
        let b = map(&[("d", 1.0)]);
        let config = CompareConfig {
            max_listed: 2,
            ..Default::default()
        };
        let text = render(&compare_maps(&a, &b, &config));
        assert!(text.contains("  - a\n  - b\n  ... and 1 more\n"));
        assert!(!text.contains("  - c\n"));
    }
}
