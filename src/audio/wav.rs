//! Raw byte-level WAV duration and concatenation.
//!
//! These operate on the canonical 44-byte PCM WAV header directly rather
//! than through a validating decoder, because `concatenate` must carry the
//! first file's header forward unmodified (format, sample rate, bit depth,
//! channel count) and only rewrite the two size fields, and `duration` must
//! degrade to zero on truncated or malformed input rather than erroring.

const HEADER_LEN: usize = 44;

/// Duration in seconds of a PCM WAV byte buffer, or `0.0` if the buffer is
/// too short or any of the fields needed for the calculation are zero.
pub fn duration(data: &[u8]) -> f64 {
    if data.len() < HEADER_LEN {
        return 0.0;
    }

    let sample_rate = u32::from_le_bytes([data[24], data[25], data[26], data[27]]);
    let data_size = u32::from_le_bytes([data[40], data[41], data[42], data[43]]);
    let bits_per_sample = u16::from_le_bytes([data[34], data[35]]);
    let num_channels = u16::from_le_bytes([data[22], data[23]]);

    if sample_rate == 0 || bits_per_sample == 0 || num_channels == 0 {
        return 0.0;
    }

    let bytes_per_sample = (bits_per_sample / 8) as u64 * num_channels as u64;
    if bytes_per_sample == 0 {
        return 0.0;
    }

    (data_size as u64 / bytes_per_sample) as f64 / sample_rate as f64
}

/// Concatenate PCM WAV buffers by keeping the first file's 44-byte header
/// and appending every file's PCM payload, rewriting the RIFF chunk size
/// (offset 4) and the `data` chunk size (offset 40).
///
/// Files beyond the first that are shorter than the header are skipped
/// entirely rather than treated as an error, matching the tolerant
/// behavior `duration` also shows toward malformed input.
pub fn concatenate(files: &[Vec<u8>]) -> crate::error::Result<Vec<u8>> {
    let first = files
        .first()
        .ok_or_else(|| crate::error::JobError::StorageFailure("no WAV files to concatenate".into()))?;

    if files.len() == 1 {
        return Ok(first.clone());
    }

    if first.len() < HEADER_LEN {
        return Err(crate::error::JobError::StorageFailure(
            "first WAV file is shorter than a valid header".into(),
        ));
    }

    let mut pcm = Vec::new();
    for file in files {
        if file.len() > HEADER_LEN {
            pcm.extend_from_slice(&file[HEADER_LEN..]);
        }
    }

    let mut result = Vec::with_capacity(HEADER_LEN + pcm.len());
    result.extend_from_slice(&first[..HEADER_LEN]);
    result.extend_from_slice(&pcm);

    let riff_size = (36 + pcm.len()) as u32;
    let data_size = pcm.len() as u32;
    result[4..8].copy_from_slice(&riff_size.to_le_bytes());
    result[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(result)
}
