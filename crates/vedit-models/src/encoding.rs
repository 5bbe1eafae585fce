//! Encoding configuration.

use serde::{Deserialize, Serialize};

/// Fixed encoder settings shared by proxy generation and cuts.
///
/// Cuts and proxies re-encode with identical settings so that timeline
/// intermediates can later be concatenated by stream copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec
    pub video_codec: String,
    /// x264 speed/quality preset
    pub preset: String,
    /// Constant rate factor (quality)
    pub crf: u8,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate
    pub audio_bitrate: String,
    /// Proxy target height in pixels; width is auto-scaled to an even value
    pub proxy_height: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 28,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            proxy_height: 360,
        }
    }
}

impl EncodingConfig {
    /// Scale filter for proxy generation (`-2` keeps width even while
    /// preserving aspect ratio).
    pub fn proxy_scale_filter(&self) -> String {
        format!("scale=-2:{}", self.proxy_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_scale_filter() {
        let enc = EncodingConfig::default();
        assert_eq!(enc.proxy_scale_filter(), "scale=-2:360");
    }
}
