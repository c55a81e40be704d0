use crate::audio::{ssml, Timepoint};
use crate::error::{JobError, Result};
use crate::voices::VoiceOption;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Synthesizes one chunk of text into WAV audio plus word-level timepoints.
/// Mark names on the returned timepoints are already resolved to
/// `"index:startRune:endRune"` in the chunk's own coordinate space; the
/// caller re-bases them into the full job's coordinate space.
#[async_trait]
pub trait TtsGenerator: Send + Sync {
    async fn generate(
        &self,
        text: &str,
        voice: &VoiceOption,
        language: &str,
    ) -> Result<(Vec<u8>, Vec<Timepoint>)>;
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    ssml: &'a str,
    language_code: &'a str,
    voice_name: &'a str,
    ssml_gender: &'a str,
    audio_encoding: &'a str,
    enable_time_pointing: Vec<&'a str>,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    audio_content: String,
    #[serde(default)]
    timepoints: Vec<RawTimepoint>,
}

#[derive(Deserialize)]
struct RawTimepoint {
    mark_name: String,
    time_seconds: f64,
}

/// Synthesizes via a configurable HTTP endpoint, in place of a vendor TTS
/// SDK. No example repo's dependency graph includes a speech-synthesis
/// vendor client, so the contract stays vendor-neutral: POST SSML plus
/// voice selection, get back base64 audio and index-keyed marks, same
/// shape a managed synthesis API returns.
pub struct HttpTtsGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTtsGenerator {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl TtsGenerator for HttpTtsGenerator {
    async fn generate(
        &self,
        text: &str,
        voice: &VoiceOption,
        language: &str,
    ) -> Result<(Vec<u8>, Vec<Timepoint>)> {
        let (ssml, words) = ssml::build_with_marks(text);
        let ssml_gender = if voice.gender == "male" { "MALE" } else { "FEMALE" };

        let request = SynthesizeRequest {
            ssml: &ssml,
            language_code: language,
            voice_name: voice.provider_voice_name,
            ssml_gender,
            audio_encoding: "LINEAR16",
            enable_time_pointing: vec!["SSML_MARK"],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| JobError::UpstreamTtsFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::UpstreamTtsFailure(format!(
                "synthesize returned status {}",
                response.status()
            )));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| JobError::UpstreamTtsFailure(e.to_string()))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&body.audio_content)
            .map_err(|e| JobError::UpstreamTtsFailure(format!("decode audio base64: {}", e)))?;

        let timepoints = body
            .timepoints
            .into_iter()
            .filter_map(|tp| {
                let idx: usize = tp.mark_name.parse().ok()?;
                let word = words.get(idx)?;
                Some(Timepoint {
                    mark_name: format!("{}:{}:{}", idx, word.start_rune, word.end_rune),
                    time_seconds: tp.time_seconds,
                })
            })
            .collect();

        Ok((audio, timepoints))
    }
}

/// Synthesizes literal silence proportional to the input length, stamped
/// with correctly-resolved marks. Lets the full pipeline (segmentation,
/// synthesis, stitching, storage) run end-to-end without network access.
pub struct SilentTtsGenerator {
    pub sample_rate: u32,
    pub seconds_per_word: f64,
}

impl Default for SilentTtsGenerator {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            seconds_per_word: 0.3,
        }
    }
}

#[async_trait]
impl TtsGenerator for SilentTtsGenerator {
    async fn generate(
        &self,
        text: &str,
        _voice: &VoiceOption,
        _language: &str,
    ) -> Result<(Vec<u8>, Vec<Timepoint>)> {
        let (_, words) = ssml::build_with_marks(text);

        let mut timepoints = Vec::with_capacity(words.len());
        let mut elapsed = 0.0;
        for (idx, word) in words.iter().enumerate() {
            timepoints.push(Timepoint {
                mark_name: format!("{}:{}:{}", idx, word.start_rune, word.end_rune),
                time_seconds: elapsed,
            });
            elapsed += self.seconds_per_word;
        }

        let total_seconds = (words.len() as f64 * self.seconds_per_word).max(self.seconds_per_word);
        let num_frames = (total_seconds * self.sample_rate as f64) as usize;
        let pcm = vec![0u8; num_frames * 2];
        let wav = build_pcm16_mono_wav(self.sample_rate, &pcm);

        Ok((wav, timepoints))
    }
}

fn build_pcm16_mono_wav(sample_rate: u32, pcm: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44 + pcm.len());
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + pcm.len() as u32).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
    buf.extend_from_slice(pcm);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices;

    #[tokio::test]
    async fn silent_generator_produces_valid_wav_and_marks() {
        let generator = SilentTtsGenerator::default();
        let voice = voices::get_by_id("ja-jp-female-a").unwrap();

        let (wav, timepoints) = generator.generate("hello world", voice, "ja-JP").await.unwrap();

        assert!(wav.len() >= 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(timepoints.len(), 2);
        assert_eq!(timepoints[0].mark_name, "0:0:5");
        assert_eq!(timepoints[1].mark_name, "1:6:11");
        assert!(timepoints[1].time_seconds > timepoints[0].time_seconds);
    }

    #[tokio::test]
    async fn silent_generator_handles_empty_text() {
        let generator = SilentTtsGenerator::default();
        let voice = voices::get_by_id("ja-jp-female-a").unwrap();

        let (wav, timepoints) = generator.generate("", voice, "ja-JP").await.unwrap();
        assert!(wav.len() >= 44);
        assert!(timepoints.is_empty());
    }
}
