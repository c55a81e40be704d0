//! Static catalog of voices the upstream synthesizer supports. `voiceId` on
//! a job is resolved against this table to find the opaque upstream voice
//! identifier and the voice's declared language.

/// A voice entry as stored internally, including the opaque upstream
/// provider identifier used to request synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub language: &'static str,
    pub gender: &'static str,
    pub description: &'static str,
    pub provider_voice_name: &'static str,
}

macro_rules! voice {
    ($id:expr, $name:expr, $lang:expr, $gender:expr, $desc:expr, $provider:expr) => {
        VoiceOption {
            id: $id,
            name: $name,
            language: $lang,
            gender: $gender,
            description: $desc,
            provider_voice_name: $provider,
        }
    };
}

pub const AVAILABLE_VOICES: &[VoiceOption] = &[
    voice!("en-us-female-a", "Emma", "en-US", "female", "Clear American female voice", "en-US-Wavenet-F"),
    voice!("en-us-male-b", "John", "en-US", "male", "Professional American male voice", "en-US-Wavenet-B"),
    voice!("en-us-female-c", "Sarah", "en-US", "female", "Warm American female voice", "en-US-Wavenet-C"),
    voice!("en-us-male-d", "Mike", "en-US", "male", "Deep American male voice", "en-US-Wavenet-D"),
    voice!("ja-jp-female-a", "あかり", "ja-JP", "female", "明るく優しい女性の声", "ja-JP-Wavenet-A"),
    voice!("ja-jp-female-b", "さくら", "ja-JP", "female", "落ち着いた女性の声", "ja-JP-Wavenet-B"),
    voice!("ja-jp-male-c", "ひろし", "ja-JP", "male", "穏やかな男性の声", "ja-JP-Wavenet-C"),
    voice!("ja-jp-male-d", "けんじ", "ja-JP", "male", "力強い男性の声", "ja-JP-Wavenet-D"),
    voice!("ja-jp-neural-female-b", "みさき", "ja-JP", "female", "自然で滑らかな女性の声 (Neural2)", "ja-JP-Neural2-B"),
    voice!("ja-jp-neural-female-c", "ゆい", "ja-JP", "female", "親しみやすい女性の声 (Neural2)", "ja-JP-Neural2-C"),
    voice!("ja-jp-neural-male-d", "たくや", "ja-JP", "male", "クリアな男性の声 (Neural2)", "ja-JP-Neural2-D"),
    voice!("de-de-female-a", "Anna", "de-DE", "female", "Klare deutsche Frauenstimme", "de-DE-Wavenet-A"),
    voice!("de-de-male-b", "Hans", "de-DE", "male", "Professionelle deutsche Männerstimme", "de-DE-Wavenet-B"),
    voice!("es-es-female-a", "María", "es-ES", "female", "Voz femenina española clara", "es-ES-Wavenet-C"),
    voice!("es-es-male-b", "Carlos", "es-ES", "male", "Voz masculina española profesional", "es-ES-Wavenet-B"),
    voice!("fr-fr-female-a", "Sophie", "fr-FR", "female", "Voix féminine française claire", "fr-FR-Wavenet-A"),
    voice!("fr-fr-male-b", "Pierre", "fr-FR", "male", "Voix masculine française professionnelle", "fr-FR-Wavenet-B"),
    voice!("it-it-female-a", "Giulia", "it-IT", "female", "Voce femminile italiana chiara", "it-IT-Wavenet-A"),
    voice!("it-it-male-b", "Marco", "it-IT", "male", "Voce maschile italiana professionale", "it-IT-Wavenet-C"),
    voice!("ko-kr-female-a", "지현", "ko-KR", "female", "밝고 친근한 여성 목소리", "ko-KR-Wavenet-A"),
    voice!("ko-kr-male-b", "민수", "ko-KR", "male", "차분한 남성 목소리", "ko-KR-Wavenet-C"),
    voice!("tr-tr-female-a", "Ayşe", "tr-TR", "female", "Net Türkçe kadın sesi", "tr-TR-Wavenet-A"),
    voice!("tr-tr-male-b", "Mehmet", "tr-TR", "male", "Profesyonel Türkçe erkek sesi", "tr-TR-Wavenet-B"),
    voice!("vi-vn-female-a", "Linh", "vi-VN", "female", "Giọng nữ Việt Nam rõ ràng", "vi-VN-Wavenet-A"),
    voice!("vi-vn-male-b", "Minh", "vi-VN", "male", "Giọng nam Việt Nam chuyên nghiệp", "vi-VN-Wavenet-B"),
    voice!("th-th-female-a", "นภา", "th-TH", "female", "เสียงผู้หญิงไทยที่ชัดเจน", "th-TH-Standard-A"),
];

/// Look up a voice by its public id.
pub fn get_by_id(voice_id: &str) -> Option<&'static VoiceOption> {
    AVAILABLE_VOICES.iter().find(|v| v.id == voice_id)
}

/// All voices for a given language code (e.g. `"ja-JP"`).
pub fn by_language(language: &str) -> Vec<&'static VoiceOption> {
    AVAILABLE_VOICES.iter().filter(|v| v.language == language).collect()
}
