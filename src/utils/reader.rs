//! Payload decompression with automatic format detection.
//!
//! CloudTrail delivers gzip-compressed files, but mirrored or re-packed
//! archives are sometimes zstd-compressed or already extracted. The format
//! is detected from the payload's magic bytes rather than the key's
//! extension, since object keys are not always trustworthy.
//!
//! # Supported Formats
//!
//! - Gzip (`1f 8b`)
//! - Zstandard (`28 b5 2f fd`)
//! - Anything else is passed through as plain bytes
//!
//! # Examples
//!
//! ```no_run
//! use cloudtrail_audit_tools::utils::reader::open_payload;
//! use std::io::Read;
//!
//! # let bytes: Vec<u8> = Vec::new();
//! let mut reader = open_payload(&bytes).unwrap();
//! let mut contents = String::new();
//! reader.read_to_string(&mut contents).unwrap();
//! ```

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Compression detected on a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    None,
}

/// Detect the compression of a payload from its leading bytes.
pub fn detect_compression(bytes: &[u8]) -> Compression {
    if bytes.starts_with(&GZIP_MAGIC) {
        Compression::Gzip
    } else if bytes.starts_with(&ZSTD_MAGIC) {
        Compression::Zstd
    } else {
        Compression::None
    }
}

/// Opens an in-memory payload with transparent decompression.
///
/// Decompression errors surface while reading, not here, except for zstd
/// whose decoder validates its frame header on construction.
pub fn open_payload(bytes: &[u8]) -> io::Result<Box<dyn Read + Send + '_>> {
    match detect_compression(bytes) {
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(bytes))),
        Compression::Zstd => Ok(Box::new(zstd::Decoder::new(bytes)?)),
        Compression::None => Ok(Box::new(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn decompress(bytes: &[u8]) -> io::Result<Vec<u8>> {
        let mut reader = open_payload(bytes)?;
        let mut out = Vec::new();
        reader.read_to_end(&mut out)?;
        Ok(out)
    }

    #[test]
    fn test_plain_payload() {
        let data = br#"{"Records": []}"#;
        assert_eq!(detect_compression(data), Compression::None);
        assert_eq!(decompress(data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_gzip_payload() {
        use flate2::write::GzEncoder;

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"compressed records").unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(detect_compression(&bytes), Compression::Gzip);
        assert_eq!(decompress(&bytes).unwrap(), b"compressed records".to_vec());
    }

    #[test]
    fn test_zstd_payload() {
        let mut encoder = zstd::Encoder::new(Vec::new(), 3).unwrap();
        encoder.write_all(b"zstd records").unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(detect_compression(&bytes), Compression::Zstd);
        assert_eq!(decompress(&bytes).unwrap(), b"zstd records".to_vec());
    }

    #[test]
    fn test_corrupt_gzip_fails() {
        // Valid gzip header followed by a deflate block with the reserved type.
        let bytes = [
            0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x07, 0x00, 0x00,
        ];
        assert_eq!(detect_compression(&bytes), Compression::Gzip);
        assert!(decompress(&bytes).is_err());
    }
}
