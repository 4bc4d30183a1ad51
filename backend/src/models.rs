use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::{response, Response};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

// Raw YouTube Data API v3 records. Every field the platform may omit is optional and
// resolved through an accessor with an explicit default.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snippet {
    pub title: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<Snippet>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    pub statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "hiddenSubscriberCount", default)]
    pub hidden_subscriber_count: bool,
}

impl SearchItem {
    pub fn video_id(&self) -> Option<&str> {
        self.id.video_id.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.snippet.as_ref()?.channel_id.as_deref()
    }
}

impl VideoItem {
    pub fn channel_id(&self) -> Option<&str> {
        self.snippet.as_ref()?.channel_id.as_deref()
    }

    /// View count of a video under analysis. A missing statistics block or count reads as 0.
    pub fn view_count(&self) -> u64 {
        self.sample_view_count().unwrap_or(0)
    }

    /// View count of a video used as a baseline observation. Videos without a statistics
    /// block carry no observation at all.
    pub fn sample_view_count(&self) -> Option<u64> {
        let statistics = self.statistics.as_ref()?;
        Some(
            statistics
                .view_count
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        )
    }
}

impl ChannelItem {
    /// Hidden or missing subscriber counts read as 0, which never passes the candidate filter.
    pub fn subscriber_count(&self) -> u64 {
        match &self.statistics {
            Some(stats) if !stats.hidden_subscriber_count => stats
                .subscriber_count
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetric {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    #[serde(rename = "channel")]
    pub channel_name: String,
    pub views: u64,
    #[serde(rename = "publish_date")]
    pub published_at: String,
    /// Unix seconds of `published_at`, 0 when the platform omitted or garbled it.
    pub published_timestamp: i64,
    pub video_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelBaseline {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    #[serde(flatten)]
    pub video: VideoMetric,
    pub subscribers: u64,
    pub outlier_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    NoVideosFound,
    NoOutliers,
    OutliersFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierReport {
    pub status: ScanStatus,
    pub message: String,
    pub keywords: Vec<String>,
    pub videos_found: usize,
    pub candidates: usize,
    pub outliers: Vec<ScoredVideo>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: Status,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: Status::BadRequest,
            error: "invalid_request".to_string(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: Status::BadGateway,
            error: "upstream_failure".to_string(),
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
