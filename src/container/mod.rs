//! SafeTensors container decoding
//!
//! Layout of a container file:
//! - bytes `[0, 8)`: little-endian `u64` header length `H`
//! - bytes `[8, 8+H)`: UTF-8 JSON header mapping tensor names to
//!   `{dtype, shape, data_offsets}`, plus an optional `__metadata__` entry
//! - bytes `[8+H, EOF)`: data section, offsets relative to its start

mod header;
mod reader;

pub use header::{parse_header, ContainerHeader, HeaderEntry, METADATA_KEY};
pub use reader::{load_tensors, read_container, SkippedTensor, TensorMap, HEADER_PREFIX_LEN};
