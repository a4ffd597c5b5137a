use std::io::{Read, Write};

use crate::error::PersistError;
use crate::format::Compression;

/// Compress a whole segment body.
pub fn compress(data: &[u8], compression: Compression) -> Result<Vec<u8>, PersistError> {
    match compression {
        Compression::Gzip => gzip(data),
        Compression::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
    }
}

/// Decompress a whole segment body.
pub fn decompress(data: &[u8], compression: Compression) -> Result<Vec<u8>, PersistError> {
    match compression {
        Compression::Gzip => gunzip(data),
        Compression::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| PersistError::Decompress(e.to_string())),
    }
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut encoder = flate2::write::GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 32),
        flate2::Compression::default(),
    );
    encoder
        .write_all(data)
        .map_err(|e| PersistError::Compress(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PersistError::Compress(e.to_string()))
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PersistError::Decompress(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn test_gzip_roundtrip() {
        let data = patterned(4096);
        let packed = compress(&data, Compression::Gzip).expect("gzip");
        assert_eq!(&packed[0..2], &[0x1f, 0x8b], "gzip magic");
        assert_eq!(decompress(&packed, Compression::Gzip).expect("gunzip"), data);
    }

    #[test]
    fn test_lz4_roundtrip() {
        let data = patterned(4096);
        let packed = compress(&data, Compression::Lz4).expect("lz4");
        assert_eq!(decompress(&packed, Compression::Lz4).expect("lz4"), data);
    }

    #[test]
    fn test_gzip_output_is_deterministic() {
        let data = patterned(1000);
        assert_eq!(
            compress(&data, Compression::Gzip).expect("gzip"),
            compress(&data, Compression::Gzip).expect("gzip")
        );
    }

    #[test]
    fn test_empty_body_roundtrips() {
        for compression in [Compression::Gzip, Compression::Lz4] {
            let packed = compress(&[], compression).expect("compress");
            assert!(decompress(&packed, compression).expect("empty").is_empty());
        }
    }

    #[test]
    fn test_garbage_rejected() {
        let result = decompress(b"definitely not gzip", Compression::Gzip);
        assert!(matches!(result, Err(PersistError::Decompress(_))));
    }

    #[test]
    fn test_wrong_codec_rejected() {
        let packed = compress(&patterned(64), Compression::Gzip).expect("gzip");
        assert!(decompress(&packed, Compression::Lz4).is_err());
    }
}
