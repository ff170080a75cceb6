// SPDX-License-Identifier: ISC
use crate::{BUFFER_LEN, Progress, ReadStatus, Result, XzReader};
#[cfg(feature = "encoder")]
use crate::{EncoderOptions, XzWriter};

/// Compresses `input` into a complete XZ stream (level 9, CRC64).
///
/// # Example
///
/// ```
/// use xz_stream::{XZ_MAGIC, compress, decompress};
///
/// let packed = compress(b"hello xz").unwrap();
/// assert_eq!(&packed[..6], &XZ_MAGIC);
/// assert_eq!(decompress(&packed).unwrap(), b"hello xz");
/// ```
#[cfg(feature = "encoder")]
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with_options(input, EncoderOptions::default())
}

/// Compresses `input` into a complete XZ stream with explicit options.
#[cfg(feature = "encoder")]
pub fn compress_with_options(input: &[u8], options: EncoderOptions) -> Result<Vec<u8>> {
    let mut writer = XzWriter::new_with_options(Vec::new(), options)?;
    writer.write_encoded(input).result?;
    writer.close()?;
    Ok(writer.into_inner().into_inner())
}

/// Decodes a complete XZ stream.
///
/// Bytes after the end of the first stream are ignored.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut reader = XzReader::new(input)?;
    let mut output = Vec::new();
    let mut chunk = vec![0u8; BUFFER_LEN];

    loop {
        let Progress { bytes, result } = reader.read_decoded(&mut chunk);
        output.extend_from_slice(&chunk[..bytes]);
        if result? == ReadStatus::End {
            break;
        }
    }

    reader.close()?;
    Ok(output)
}
