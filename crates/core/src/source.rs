use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::{KartochkiError, Result};
use crate::types::{Transcript, TranscriptSegment};

/// Where transcripts come from. The production implementation talks to
/// YouTube through yt-dlp; tests substitute a fake.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_url: &str) -> Result<Transcript>;
}

/// Fetches caption tracks via yt-dlp without downloading the video itself.
pub struct YtDlpTranscriptSource {
    client: reqwest::Client,
}

impl YtDlpTranscriptSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YtDlpTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    async fn fetch(&self, video_url: &str) -> Result<Transcript> {
        let output = Command::new("yt-dlp")
            .arg(video_url)
            .arg("--dump-json")
            .arg("--skip-download")
            .arg("--extractor-args")
            .arg("youtube:player_client=android,web")
            .output()
            .await?;

        if !output.status.success() {
            return Err(KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let info: Value = serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim())
            .map_err(|err| KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: format!("unreadable video metadata: {err}"),
            })?;

        let track_url =
            select_caption_track(&info).ok_or_else(|| KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: "video has no caption track".to_string(),
            })?;

        debug!(url = video_url, "fetching caption track");

        let track: Value = self
            .client
            .get(track_url)
            .send()
            .await
            .map_err(|err| KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: format!("caption track fetch failed: {err}"),
            })?
            .json()
            .await
            .map_err(|err| KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: format!("unreadable caption track: {err}"),
            })?;

        let segments = parse_caption_events(&track);
        if segments.is_empty() {
            return Err(KartochkiError::SourceUnavailable {
                url: video_url.to_string(),
                reason: "caption track contains no text".to_string(),
            });
        }

        Ok(Transcript {
            title: info["title"].as_str().unwrap_or_default().to_string(),
            author: info["uploader"].as_str().unwrap_or_default().to_string(),
            duration_seconds: info["duration"].as_f64().unwrap_or(0.0),
            segments,
        })
    }
}

/// Picks a json3 caption URL from yt-dlp video metadata.
///
/// Manual subtitles win over automatic captions; within a source the video's
/// own language wins over English, English over whatever is listed first.
pub fn select_caption_track(info: &Value) -> Option<&str> {
    let video_lang = info["language"].as_str();

    for key in ["subtitles", "automatic_captions"] {
        let Some(tracks) = info[key].as_object() else {
            continue;
        };
        if tracks.is_empty() {
            continue;
        }

        let Some(lang) = video_lang
            .filter(|lang| tracks.contains_key(*lang))
            .or_else(|| tracks.contains_key("en").then_some("en"))
            .or_else(|| tracks.keys().next().map(String::as_str))
        else {
            continue;
        };

        let url = tracks[lang].as_array().and_then(|formats| {
            formats
                .iter()
                .find(|format| format["ext"] == "json3")
                .and_then(|format| format["url"].as_str())
        });

        if url.is_some() {
            return url;
        }
    }

    None
}

/// Flattens a json3 caption track into ordered transcript segments.
pub fn parse_caption_events(track: &Value) -> Vec<TranscriptSegment> {
    let Some(events) = track["events"].as_array() else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let start = event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0;
            let text: String = event["segs"]
                .as_array()?
                .iter()
                .filter_map(|seg| seg["utf8"].as_str())
                .collect();
            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start,
                content: text,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caption_track_prefers_manual_subtitles() {
        let info = json!({
            "language": "en",
            "subtitles": {
                "en": [
                    {"ext": "vtt", "url": "https://example.com/en.vtt"},
                    {"ext": "json3", "url": "https://example.com/en.json3"},
                ],
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://example.com/auto.json3"}],
            },
        });

        assert_eq!(
            select_caption_track(&info),
            Some("https://example.com/en.json3")
        );
    }

    #[test]
    fn caption_track_falls_back_to_automatic_captions() {
        let info = json!({
            "subtitles": {},
            "automatic_captions": {
                "de": [{"ext": "json3", "url": "https://example.com/de.json3"}],
            },
        });

        assert_eq!(
            select_caption_track(&info),
            Some("https://example.com/de.json3")
        );
    }

    #[test]
    fn caption_track_missing_means_no_transcript() {
        let info = json!({"title": "no captions here"});
        assert_eq!(select_caption_track(&info), None);
    }

    #[test]
    fn caption_events_flatten_in_order() {
        let track = json!({
            "events": [
                {"tStartMs": 0, "segs": [{"utf8": "hello "}, {"utf8": "world"}]},
                {"tStartMs": 1500, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 3200, "segs": [{"utf8": "second line"}]},
            ],
        });

        let segments = parse_caption_events(&track);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].content, "hello world");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[1].content, "second line");
        assert_eq!(segments[1].start, 3.2);
    }
}
