pub mod detection;
pub mod outlier_service;
pub mod youtube_service;
