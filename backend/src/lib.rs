//! Finds recently published YouTube videos whose views far outrun their channel's audience.

#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::ScanConfig;
use crate::services::youtube_service::VideoSource;
use rocket::{Build, Rocket};
use std::sync::Arc;

pub struct AppState {
    pub source: Arc<dyn VideoSource>,
    pub scan: ScanConfig,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/api", routes![api::health, api::find_outliers])
}
