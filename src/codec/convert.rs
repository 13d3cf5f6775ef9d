//! Byte span to element buffer conversion

use half::f16;

use super::DType;
use crate::tensor::TensorData;

/// Widen a brain-float bit pattern to `f32`.
///
/// BF16 keeps float32's sign and exponent fields, so shifting the 16 bits
/// into the high half of a `u32` and reinterpreting is exact.
#[inline]
pub fn bf16_to_f32(bits: u16) -> f32 {
    f32::from_bits(u32::from(bits) << 16)
}

/// Widen an IEEE half-precision bit pattern to `f32`
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

/// Decode a little-endian byte span into a flat element buffer.
///
/// The result has `bytes.len() / dtype.element_size()` elements; callers
/// check span length against the declared shape beforehand.
pub fn decode(bytes: &[u8], dtype: DType) -> TensorData {
    match dtype {
        DType::F32 => TensorData::F32(
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        ),
        DType::F16 => TensorData::F32(
            bytes
                .chunks_exact(2)
                .map(|b| f16_to_f32(u16::from_le_bytes([b[0], b[1]])))
                .collect(),
        ),
        DType::BF16 => TensorData::F32(
            bytes
                .chunks_exact(2)
                .map(|b| bf16_to_f32(u16::from_le_bytes([b[0], b[1]])))
                .collect(),
        ),
        DType::I32 => TensorData::I32(
            bytes
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        ),
        DType::I64 => TensorData::I64(
            bytes
                .chunks_exact(8)
                .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::bf16;

    #[test]
    fn test_bf16_one() {
        let value = bf16_to_f32(0x3F80);
        assert_eq!(value, 1.0f32);
        assert_eq!(value.to_bits(), 0x3F80_0000);
    }

    #[test]
    fn test_bf16_matches_half_crate() {
        for bits in [0x0000u16, 0x8000, 0x3F80, 0xBF80, 0x4049, 0x7F80, 0xFF80, 0x0001, 0x7F7F] {
            assert_eq!(bf16_to_f32(bits).to_bits(), bf16::from_bits(bits).to_f32().to_bits());
        }
    }

    #[test]
    fn test_bf16_renarrow_is_exact() {
        for bits in [0x3F80u16, 0xC2F7, 0x0080, 0x3DCC] {
            let wide = bf16_to_f32(bits);
            assert_eq!((wide.to_bits() >> 16) as u16, bits);
            assert_eq!(wide.to_bits() & 0xFFFF, 0);
        }
    }

    #[test]
    fn test_f16_widening() {
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        assert_eq!(f16_to_f32(0xC000), -2.0);
        assert_eq!(f16_to_f32(0x3800), 0.5);
    }

    #[test]
    fn test_decode_f32() {
        let bytes: Vec<u8> = [0.0f32, 1.5, -3.25].iter().flat_map(|f| f.to_le_bytes()).collect();
        assert_eq!(decode(&bytes, DType::F32), TensorData::F32(vec![0.0, 1.5, -3.25]));
    }

    #[test]
    fn test_decode_bf16() {
        let bytes: Vec<u8> = [0x3F80u16, 0xC000].iter().flat_map(|b| b.to_le_bytes()).collect();
        assert_eq!(decode(&bytes, DType::BF16), TensorData::F32(vec![1.0, -2.0]));
    }

    #[test]
    fn test_decode_integers() {
        let bytes: Vec<u8> = [7i32, -1].iter().flat_map(|i| i.to_le_bytes()).collect();
        assert_eq!(decode(&bytes, DType::I32), TensorData::I32(vec![7, -1]));

        let bytes: Vec<u8> = [i64::MAX, i64::MIN].iter().flat_map(|i| i.to_le_bytes()).collect();
        assert_eq!(decode(&bytes, DType::I64), TensorData::I64(vec![i64::MAX, i64::MIN]));
    }

    #[test]
    fn test_decode_length() {
        let bytes = vec![0u8; 12];
        assert_eq!(decode(&bytes, DType::F16).len(), 6);
        assert_eq!(decode(&bytes, DType::I32).len(), 3);
        assert_eq!(decode(&bytes, DType::I64).len(), 1);
    }
}
