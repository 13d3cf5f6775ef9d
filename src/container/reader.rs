//! Container file reader
//!
//! Reads the header, then one bounded read per tensor span.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::header::{parse_header, HeaderEntry};
use crate::codec::{self, DType};
use crate::error::{ContainerError, Result};
use crate::tensor::Tensor;
use crate::utils::shape_utils;

/// Size of the little-endian header length prefix
pub const HEADER_PREFIX_LEN: u64 = 8;

/// A header entry left out of the map because its dtype is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTensor {
    /// Tensor name
    pub name: String,
    /// The unrecognized dtype tag
    pub dtype: String,
}

/// Decoded tensors of one container file, keyed and ordered by name
#[derive(Debug, Clone, Default)]
pub struct TensorMap {
    path: PathBuf,
    tensors: BTreeMap<String, Tensor>,
    skipped: Vec<SkippedTensor>,
    metadata: Option<Value>,
}

impl TensorMap {
    /// Build a map directly from tensors
    pub fn from_tensors(path: impl Into<PathBuf>, tensors: impl IntoIterator<Item = Tensor>) -> Self {
        Self {
            path: path.into(),
            tensors: tensors.into_iter().map(|t| (t.name().to_string(), t)).collect(),
            skipped: Vec::new(),
            metadata: None,
        }
    }

    /// Source path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of decoded tensors
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Look up a tensor by name
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    /// Check whether a tensor was decoded
    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    /// Tensor names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// Entries skipped for an unknown dtype
    pub fn skipped(&self) -> &[SkippedTensor] {
        &self.skipped
    }

    /// Contents of the `__metadata__` entry
    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }
}

/// Load every tensor of a container file
pub fn load_tensors<P: AsRef<Path>>(path: P) -> Result<TensorMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ContainerError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut map = read_container(&mut reader, file_len)?;
    map.path = path.to_path_buf();

    info!("Loaded {} tensors from {:?}", map.len(), path);
    Ok(map)
}

/// Decode a container from any seekable source of `file_len` bytes
pub fn read_container<R: Read + Seek>(reader: &mut R, file_len: u64) -> Result<TensorMap> {
    if file_len < HEADER_PREFIX_LEN {
        return Err(ContainerError::malformed(format!(
            "file is {} bytes, too small for the {}-byte header length",
            file_len, HEADER_PREFIX_LEN
        )));
    }

    reader.seek(SeekFrom::Start(0))?;
    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes)?;
    let header_len = u64::from_le_bytes(len_bytes);

    let remaining = file_len - HEADER_PREFIX_LEN;
    if header_len > remaining {
        return Err(ContainerError::malformed(format!(
            "header length {} exceeds the {} bytes after the prefix",
            header_len, remaining
        )));
    }

    let mut header_bytes = vec![0u8; header_len as usize];
    reader.read_exact(&mut header_bytes)?;
    let header = parse_header(&header_bytes)?;

    let data_start = HEADER_PREFIX_LEN + header_len;
    debug!("Data section starts at byte {}", data_start);

    let mut map = TensorMap {
        metadata: header.metadata,
        ..TensorMap::default()
    };

    for (name, entry) in header.entries {
        let Some(dtype) = DType::from_tag(&entry.dtype) else {
            warn!("Unknown dtype {} for tensor {}, skipping", entry.dtype, name);
            map.skipped.push(SkippedTensor {
                name,
                dtype: entry.dtype,
            });
            continue;
        };

        let tensor = read_tensor(reader, &name, &entry, dtype, data_start, file_len)?;
        map.tensors.insert(name, tensor);
    }

    Ok(map)
}

fn read_tensor<R: Read + Seek>(
    reader: &mut R,
    name: &str,
    entry: &HeaderEntry,
    dtype: DType,
    data_start: u64,
    file_len: u64,
) -> Result<Tensor> {
    let start = data_start.checked_add(entry.start());
    let end = data_start.checked_add(entry.end());
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if end <= file_len => (start, end),
        _ => {
            return Err(ContainerError::TruncatedData {
                name: name.to_string(),
                end: end.unwrap_or(u64::MAX),
                file_len,
            })
        }
    };

    let actual = entry.byte_len();
    let expected = shape_utils::num_elements(&entry.shape)
        .and_then(|n| (n as u64).checked_mul(dtype.element_size() as u64));
    if expected != Some(actual) {
        return Err(ContainerError::ShapeMismatch {
            name: name.to_string(),
            shape: entry.shape.clone(),
            expected: expected.unwrap_or(u64::MAX),
            actual,
        });
    }

    reader.seek(SeekFrom::Start(start))?;
    let mut raw = vec![0u8; (end - start) as usize];
    reader.read_exact(&mut raw)?;

    let data = codec::decode(&raw, dtype);
    debug!("{}: {} {:?} ({} bytes)", name, dtype, entry.shape, raw.len());

    Tensor::new(name, entry.shape.clone(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::TensorData;
    use std::io::Cursor;

    fn build(header: &str, data: &[u8]) -> Vec<u8> {
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    fn decode(bytes: Vec<u8>) -> Result<TensorMap> {
        let len = bytes.len() as u64;
        read_container(&mut Cursor::new(bytes), len)
    }

    #[test]
    fn test_read_mixed_dtypes() {
        let header = r#"{"a":{"dtype":"I32","shape":[2],"data_offsets":[0,8]},"b":{"dtype":"BF16","shape":[1],"data_offsets":[8,10]}}"#;
        let mut data: Vec<u8> = [5i32, -6].iter().flat_map(|i| i.to_le_bytes()).collect();
        data.extend_from_slice(&0x3F80u16.to_le_bytes());

        let map = decode(build(header, &data)).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a").unwrap().data(), &TensorData::I32(vec![5, -6]));
        assert_eq!(map.get("b").unwrap().data(), &TensorData::F32(vec![1.0]));
    }

    #[test]
    fn test_file_shorter_than_prefix() {
        let err = decode(vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ContainerError::MalformedHeader(_)));
    }

    #[test]
    fn test_absurd_header_length() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let err = decode(bytes).unwrap_err();
        assert!(matches!(err, ContainerError::MalformedHeader(_)));
    }

    #[test]
    fn test_truncated_data() {
        let header = r#"{"w":{"dtype":"F32","shape":[4],"data_offsets":[0,16]}}"#;
        let err = decode(build(header, &[0u8; 8])).unwrap_err();
        assert!(matches!(err, ContainerError::TruncatedData { ref name, .. } if name == "w"));
    }

    #[test]
    fn test_span_disagrees_with_shape() {
        let header = r#"{"w":{"dtype":"F32","shape":[3],"data_offsets":[0,8]}}"#;
        let err = decode(build(header, &[0u8; 8])).unwrap_err();
        assert!(matches!(err, ContainerError::ShapeMismatch { expected: 12, actual: 8, .. }));
    }

    #[test]
    fn test_overflowing_shape_with_empty_span() {
        let header = format!(
            r#"{{"w":{{"dtype":"F32","shape":[{},{},16],"data_offsets":[0,0]}}}}"#,
            1u64 << 32,
            1u64 << 32
        );
        let err = decode(build(&header, &[])).unwrap_err();
        assert!(matches!(err, ContainerError::ShapeMismatch { ref name, actual: 0, .. } if name == "w"));

        let header = format!(
            r#"{{"w":{{"dtype":"I64","shape":[{},2],"data_offsets":[0,0]}}}}"#,
            usize::MAX
        );
        let err = decode(build(&header, &[])).unwrap_err();
        assert!(matches!(err, ContainerError::ShapeMismatch { expected: u64::MAX, .. }));
    }

    #[test]
    fn test_unknown_dtype_skipped() {
        let header = r#"{"odd":{"dtype":"F8_E4M3","shape":[2],"data_offsets":[0,2]},"w":{"dtype":"I64","shape":[],"data_offsets":[2,10]}}"#;
        let mut data = vec![0u8, 0];
        data.extend_from_slice(&9i64.to_le_bytes());

        let map = decode(build(header, &data)).unwrap();
        assert!(!map.contains("odd"));
        assert!(map.contains("w"));
        assert_eq!(
            map.skipped(),
            &[SkippedTensor {
                name: "odd".to_string(),
                dtype: "F8_E4M3".to_string()
            }]
        );
    }

    #[test]
    fn test_metadata_kept_aside() {
        let header = r#"{"__metadata__":{"format":"pt"}}"#;
        let map = decode(build(header, &[])).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.metadata().unwrap()["format"], "pt");
    }

    #[test]
    fn test_load_missing_path() {
        let err = load_tensors("/definitely/not/here.safetensors").unwrap_err();
        assert!(matches!(err, ContainerError::NotFound(_)));
    }
}
