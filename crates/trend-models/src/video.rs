//! Trending video records.

use serde::{Deserialize, Serialize};

/// Normalized trending video, as cached and served to clients.
///
/// Every key is always serialized so consumers can rely on the shape even when
/// the upstream API omits a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,

    pub title: Option<String>,

    pub description: Option<String>,

    /// First thumbnail URL, empty when the upstream had none.
    #[serde(rename = "thumbnail", alias = "thumbnailUrl", default)]
    pub thumbnail_url: String,

    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,

    /// View count as reported upstream (digits only, no formatting).
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,

    /// Relative publish text, e.g. "3 hours ago".
    #[serde(rename = "publishedText")]
    pub published_text: Option<String>,
}

impl VideoRecord {
    /// Wire keys of a serialized record, in declaration order.
    pub const FIELDS: [&'static str; 7] = [
        "videoId",
        "title",
        "description",
        "thumbnail",
        "channelTitle",
        "viewCount",
        "publishedText",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_serialized_when_empty() {
        let record = VideoRecord {
            video_id: None,
            title: None,
            description: None,
            thumbnail_url: String::new(),
            channel_title: None,
            view_count: None,
            published_text: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), VideoRecord::FIELDS.len());
        for key in VideoRecord::FIELDS {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["thumbnail"], "");
        assert!(obj["videoId"].is_null());
    }

    #[test]
    fn test_accepts_thumbnail_url_alias() {
        let record: VideoRecord = serde_json::from_value(serde_json::json!({
            "videoId": "abc",
            "title": "t",
            "description": null,
            "thumbnailUrl": "https://i.ytimg.com/vi/abc/default.jpg",
            "channelTitle": "c",
            "viewCount": "12",
            "publishedText": "1 day ago"
        }))
        .unwrap();
        assert_eq!(record.thumbnail_url, "https://i.ytimg.com/vi/abc/default.jpg");
    }
}
