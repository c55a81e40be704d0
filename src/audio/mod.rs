pub mod segmenter;
pub mod ssml;
pub mod timepoints;
pub mod wav;

use serde::{Deserialize, Serialize};

/// A single word-level timing mark in the stitched audio. `mark_name`
/// encodes the source-text rune span that produced it, in the form
/// `"index:startRune:endRune"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timepoint {
    #[serde(rename = "markName")]
    pub mark_name: String,
    #[serde(rename = "timeSeconds")]
    pub time_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timepoint_serializes_with_camel_case_fields() {
        let tp = Timepoint {
            mark_name: "0:0:5".to_string(),
            time_seconds: 1.25,
        };
        let json = serde_json::to_string(&tp).unwrap();
        assert!(json.contains("\"markName\""));
        assert!(json.contains("\"timeSeconds\""));
    }
}
