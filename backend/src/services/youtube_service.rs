use crate::config::YoutubeConfig;
use crate::models::{
    ChannelItem, ChannelListResponse, SearchItem, SearchListResponse, VideoItem, VideoListResponse,
};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `videos.list` and `channels.list` accept at most this many ids per request.
const MAX_IDS_PER_REQUEST: usize = 50;

/// Fetch collaborators of the outlier scan. Any error aborts the scan.
#[rocket::async_trait]
pub trait VideoSource: Send + Sync {
    /// Videos matching all keywords published after `published_after`.
    async fn search_recent_videos(
        &self,
        keywords: &[String],
        published_after: DateTime<Utc>,
    ) -> Result<Vec<SearchItem>>;

    async fn fetch_video_stats(&self, video_ids: &[String]) -> Result<Vec<VideoItem>>;

    async fn fetch_channel_stats(&self, channel_ids: &[String]) -> Result<Vec<ChannelItem>>;

    /// Ids of up to `max_results` of the channel's newest videos.
    async fn fetch_channel_recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>>;
}

pub struct YoutubeClient {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    // Documentation: https://developers.google.com/youtube/v3/docs
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            resource
        );
        debug!("GET {url} {params:?}");

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("YouTube {resource} request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube {resource} request failed with status {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse YouTube {resource} response"))
    }
}

#[rocket::async_trait]
impl VideoSource for YoutubeClient {
    async fn search_recent_videos(
        &self,
        keywords: &[String],
        published_after: DateTime<Utc>,
    ) -> Result<Vec<SearchItem>> {
        let params = [
            ("part", "id,snippet".to_string()),
            ("type", "video".to_string()),
            ("q", keywords.join(" ")),
            ("publishedAfter", format_published_after(published_after)),
            ("maxResults", self.config.max_search_results.to_string()),
        ];
        let response: SearchListResponse = self.get_json("search", &params).await?;
        Ok(response.items)
    }

    async fn fetch_video_stats(&self, video_ids: &[String]) -> Result<Vec<VideoItem>> {
        let mut items = Vec::new();
        for chunk in video_ids.chunks(MAX_IDS_PER_REQUEST) {
            let params = [
                ("part", "statistics,snippet".to_string()),
                ("id", chunk.join(",")),
            ];
            let response: VideoListResponse = self.get_json("videos", &params).await?;
            items.extend(response.items);
        }
        Ok(items)
    }

    async fn fetch_channel_stats(&self, channel_ids: &[String]) -> Result<Vec<ChannelItem>> {
        let mut items = Vec::new();
        for chunk in channel_ids.chunks(MAX_IDS_PER_REQUEST) {
            let params = [("part", "statistics".to_string()), ("id", chunk.join(","))];
            let response: ChannelListResponse = self.get_json("channels", &params).await?;
            items.extend(response.items);
        }
        Ok(items)
    }

    async fn fetch_channel_recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>> {
        let params = [
            ("part", "id".to_string()),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            ("channelId", channel_id.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let response: SearchListResponse = self.get_json("search", &params).await?;
        Ok(response
            .items
            .iter()
            .filter_map(|item| item.video_id().map(String::from))
            .collect())
    }
}

/// RFC 3339 with a `Z` suffix, as `search.list` expects.
pub fn format_published_after(published_after: DateTime<Utc>) -> String {
    published_after.to_rfc3339_opts(SecondsFormat::Secs, true)
}
