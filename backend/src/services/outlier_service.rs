use crate::config::ScanConfig;
use crate::models::{OutlierReport, ScanStatus, ScoredVideo, VideoItem, VideoMetric};
use crate::services::detection::{baseline_for_candidate, is_candidate, outlier_score, rank};
use crate::services::youtube_service::VideoSource;
use crate::utils::{
    dedup_preserving_order, parse_iso8601_to_timestamp, search_window_start, video_url,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;

/// (video id, view count) observations of one channel's newest videos.
type ChannelSample = Vec<(String, u64)>;

/// Runs one scan: discover recent videos for `keywords`, keep the ones that outgrew their
/// channel, score them against the channel's recent videos and rank the survivors.
///
/// A failing fetch aborts the whole scan; no partial report is produced.
pub async fn scan_for_outliers(
    source: &dyn VideoSource,
    config: &ScanConfig,
    keywords: &[String],
    now: DateTime<Utc>,
) -> Result<OutlierReport> {
    if keywords.is_empty() {
        anyhow::bail!("At least one keyword is required");
    }
    info!("Scanning for outliers: {}", keywords.join(", "));

    let published_after = search_window_start(now, config.window_days)?;
    let search_results = source
        .search_recent_videos(keywords, published_after)
        .await
        .context("Failed to search recent videos")?;

    let video_ids = dedup_preserving_order(search_results.iter().filter_map(|r| r.video_id()));
    if video_ids.is_empty() {
        info!("No videos found for: {}", keywords.join(", "));
        return Ok(OutlierReport {
            status: ScanStatus::NoVideosFound,
            message: format!(
                "No videos found for the given keywords in the past {} days.",
                config.window_days
            ),
            keywords: keywords.to_vec(),
            videos_found: 0,
            candidates: 0,
            outliers: Vec::new(),
        });
    }
    let channel_ids =
        dedup_preserving_order(search_results.iter().filter_map(|r| r.channel_id()));

    let videos = source
        .fetch_video_stats(&video_ids)
        .await
        .context("Failed to fetch video statistics")?;
    let subscribers: HashMap<String, u64> = source
        .fetch_channel_stats(&channel_ids)
        .await
        .context("Failed to fetch channel statistics")?
        .into_iter()
        .map(|channel| {
            let count = channel.subscriber_count();
            (channel.id, count)
        })
        .collect();
    info!(
        "Found {} videos across {} channels ({} with statistics)",
        video_ids.len(),
        channel_ids.len(),
        subscribers.len()
    );

    let mut samples: HashMap<String, ChannelSample> = HashMap::new();
    let mut scored = Vec::new();
    for video in &videos {
        let Some(channel_id) = video.channel_id() else {
            debug!("Skipping video {}: no channel id", video.id);
            continue;
        };
        let Some(&channel_subs) = subscribers.get(channel_id) else {
            debug!("Skipping video {}: unknown channel {channel_id}", video.id);
            continue;
        };
        let views = video.view_count();
        if !is_candidate(views, channel_subs) {
            debug!(
                "Skipping video {}: {views} views for {channel_subs} subscribers",
                video.id
            );
            continue;
        }

        if !samples.contains_key(channel_id) {
            let sample = fetch_channel_sample(source, channel_id, config.channel_sample_size)
                .await
                .with_context(|| {
                    format!("Failed to fetch recent videos of channel {channel_id}")
                })?;
            samples.insert(channel_id.to_string(), sample);
        }
        let sample: Vec<u64> = samples
            .get(channel_id)
            .map(|sample| {
                sample
                    .iter()
                    .filter(|(id, _)| config.include_candidate_in_baseline || *id != video.id)
                    .map(|&(_, views)| views)
                    .collect()
            })
            .unwrap_or_default();

        let baseline = baseline_for_candidate(&sample, views);
        let score = outlier_score(views, baseline.mean, baseline.std_dev);
        debug!(
            "Candidate {}: {views} views, baseline {:.2} ± {:.2} over {} videos, score {score}",
            video.id,
            baseline.mean,
            baseline.std_dev,
            sample.len()
        );

        scored.push(ScoredVideo {
            video: to_video_metric(video, channel_id, views),
            subscribers: channel_subs,
            outlier_score: score,
        });
    }

    let candidates = scored.len();
    let outliers = rank(scored);
    info!(
        "{} candidates, {} outliers for: {}",
        candidates,
        outliers.len(),
        keywords.join(", ")
    );

    let (status, message) = if outliers.is_empty() {
        (
            ScanStatus::NoOutliers,
            "No viral videos found based on the criteria.".to_string(),
        )
    } else {
        (
            ScanStatus::OutliersFound,
            format!("Found {} viral videos.", outliers.len()),
        )
    };

    Ok(OutlierReport {
        status,
        message,
        keywords: keywords.to_vec(),
        videos_found: video_ids.len(),
        candidates,
        outliers,
    })
}

async fn fetch_channel_sample(
    source: &dyn VideoSource,
    channel_id: &str,
    sample_size: u32,
) -> Result<ChannelSample> {
    let ids = source
        .fetch_channel_recent_video_ids(channel_id, sample_size)
        .await?;
    let videos = source.fetch_video_stats(&ids).await?;
    // Videos without a statistics block carry no observation.
    Ok(videos
        .into_iter()
        .filter_map(|v| v.sample_view_count().map(|views| (v.id, views)))
        .collect())
}

fn to_video_metric(video: &VideoItem, channel_id: &str, views: u64) -> VideoMetric {
    let snippet = video.snippet.clone().unwrap_or_default();
    VideoMetric {
        video_id: video.id.clone(),
        title: snippet.title.unwrap_or_default(),
        channel_id: channel_id.to_string(),
        channel_name: snippet.channel_title.unwrap_or_default(),
        views,
        published_timestamp: snippet
            .published_at
            .as_deref()
            .map(parse_iso8601_to_timestamp)
            .unwrap_or(0),
        published_at: snippet.published_at.unwrap_or_default(),
        video_url: video_url(&video.id),
    }
}
