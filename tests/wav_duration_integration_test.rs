use porua_tts_jobs::audio::wav;

/// Build a synthetic mono 16-bit PCM WAV with `num_samples` of silence.
fn make_wav(sample_rate: u32, num_samples: usize) -> Vec<u8> {
    let byte_rate = sample_rate * 2;
    let data_len = (num_samples * 2) as u32;
    let riff_len = 36 + data_len;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_len.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend(std::iter::repeat(0u8).take(data_len as usize));
    wav
}

#[test]
fn calculates_one_second_of_silence() {
    let wav_bytes = make_wav(24000, 24000);
    let duration = wav::duration(&wav_bytes);
    assert!((duration - 1.0).abs() < 0.001);
}

#[test]
fn concatenates_two_chunks_into_one_playable_file() {
    let first = make_wav(16000, 8000);
    let second = make_wav(16000, 4000);

    let combined = wav::concatenate(&[first, second]).unwrap();
    let duration = wav::duration(&combined);

    assert!((duration - 0.75).abs() < 0.001);
}
