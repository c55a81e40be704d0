/// Maximum UTF-8 byte size of a single text chunk handed to the upstream TTS
/// provider in one SSML request.
///
/// The provider's hard SSML cap is 5000 characters; each word grows by
/// roughly 20-30 bytes of `<mark name="N"/>` overhead once wrapped, so 4500
/// leaves margin for worst-case mark expansion without risking a rejected
/// request. Two source revisions disagreed (1000 vs 4500) — this is the
/// value that ships.
pub const MAX_CHUNK_BYTES: usize = 4500;

/// Default voice when a `POST /jobs` request omits `voiceId`.
pub const DEFAULT_VOICE_ID: &str = "ja-jp-female-a";

/// Default style hint when a `POST /jobs` request omits `style`.
pub const DEFAULT_STYLE: &str = "cheerfully";
