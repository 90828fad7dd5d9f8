//! Primitive field encoders shared by the option and message codecs.
//!
//! BOOTP fields are fixed-width and big-endian. Nothing here allocates
//! beyond the destination buffer.

use super::CodecError;
use bytes::BufMut;

/// Encodes a `u16` in network byte order.
pub fn be16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Encodes a `u32` in network byte order.
pub fn be32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Writes `src` left-justified into a field of exactly `width` bytes,
/// zero-padding on the right.
///
/// Fails without writing anything if `src` is wider than the field.
pub fn put_fixed_bytes<B: BufMut>(buf: &mut B, src: &[u8], width: usize) -> Result<(), CodecError> {
    if src.len() > width {
        return Err(CodecError::FieldTooWide {
            len: src.len(),
            width,
        });
    }
    buf.put_slice(src);
    buf.put_bytes(0, width - src.len());
    Ok(())
}

/// Returns `src` left-justified and zero-padded to `width` bytes.
pub fn fixed_bytes(src: &[u8], width: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(width);
    put_fixed_bytes(&mut out, src, width)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_integers() {
        assert_eq!(be16(0x8000), [0x80, 0x00]);
        assert_eq!(be32(84600), [0x00, 0x01, 0x4A, 0x78]);
        assert_eq!(be32(0x6382_5363), [0x63, 0x82, 0x53, 0x63]);
    }

    #[test]
    fn test_fixed_bytes_pads_on_the_right() {
        let out = fixed_bytes(&[0xAA, 0xBB], 5).unwrap();
        assert_eq!(out, vec![0xAA, 0xBB, 0x00, 0x00, 0x00]);

        assert_eq!(fixed_bytes(&[], 3).unwrap(), vec![0; 3]);
        assert_eq!(fixed_bytes(&[1, 2, 3], 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_fixed_bytes_rejects_oversized_input() {
        let mut buf = Vec::new();
        let err = put_fixed_bytes(&mut buf, &[0; 17], 16).unwrap_err();

        assert!(matches!(err, CodecError::FieldTooWide { len: 17, width: 16 }));
        assert!(buf.is_empty());
    }
}
