use crate::services::youtube_service::YoutubeClient;
use crate::AppState;
use anyhow::{Context, Result};
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Longest accepted "recently published" window.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Credentials and limits for the YouTube Data API client. Immutable once built.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_search_results: u32,
}

/// Tunables of one outlier scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub window_days: i64,
    pub channel_sample_size: u32,
    pub min_keywords: usize,
    pub include_candidate_in_baseline: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            channel_sample_size: 10,
            min_keywords: 1,
            include_candidate_in_baseline: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube: YoutubeConfig,
    pub scan: ScanConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("YOUTUBE_API_KEY")
            .context("YOUTUBE_API_KEY environment variable must be set")?;
        if api_key.trim().is_empty() {
            anyhow::bail!("YOUTUBE_API_KEY environment variable is empty");
        }

        let youtube = YoutubeConfig {
            api_key: api_key.trim().to_string(),
            base_url: env::var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YOUTUBE_API_BASE_URL.to_string()),
            max_search_results: env_setting("OUTLIER_MAX_SEARCH_RESULTS", 50u32).clamp(1, 50),
        };
        let scan = scan_config_from(|key| env::var(key).ok());

        Ok(Self { youtube, scan })
    }
}

fn scan_config_from(lookup: impl Fn(&str) -> Option<String>) -> ScanConfig {
    let defaults = ScanConfig::default();
    ScanConfig {
        window_days: parse_setting(
            "OUTLIER_WINDOW_DAYS",
            lookup("OUTLIER_WINDOW_DAYS"),
            defaults.window_days,
        )
        .clamp(1, MAX_WINDOW_DAYS),
        channel_sample_size: parse_setting(
            "OUTLIER_CHANNEL_SAMPLE_SIZE",
            lookup("OUTLIER_CHANNEL_SAMPLE_SIZE"),
            defaults.channel_sample_size,
        )
        .clamp(1, 50),
        min_keywords: parse_setting(
            "OUTLIER_MIN_KEYWORDS",
            lookup("OUTLIER_MIN_KEYWORDS"),
            defaults.min_keywords,
        )
        .max(1),
        include_candidate_in_baseline: parse_setting(
            "OUTLIER_INCLUDE_CANDIDATE_IN_BASELINE",
            lookup("OUTLIER_INCLUDE_CANDIDATE_IN_BASELINE"),
            defaults.include_candidate_in_baseline,
        ),
    }
}

fn env_setting<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    parse_setting(key, env::var(key).ok(), default)
}

fn parse_setting<T: FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value '{value}' for {key}, using {default}");
            default
        }),
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting outlier backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_youtube_client(config: YoutubeConfig) -> Result<YoutubeClient> {
    info!("Using YouTube Data API at: {}", config.base_url);
    YoutubeClient::new(config)
}

pub fn create_app_state() -> Result<AppState> {
    let config = AppConfig::from_env()?;
    let client = create_youtube_client(config.youtube)?;

    info!(
        "Scan window: {} days, channel sample size: {}, candidate in baseline: {}",
        config.scan.window_days,
        config.scan.channel_sample_size,
        config.scan.include_candidate_in_baseline
    );

    Ok(AppState {
        source: Arc::new(client),
        scan: config.scan,
    })
}
