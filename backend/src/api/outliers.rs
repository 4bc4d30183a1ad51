use crate::models::{ErrorResponse, OutlierReport};
use crate::services::outlier_service;
use crate::utils::parse_keywords;
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/health")]
pub fn health() -> &'static str {
    "ok"
}

/// `GET /api/outliers?keywords=a,b,c`
#[get("/outliers?<keywords>")]
pub async fn find_outliers(
    keywords: Option<String>,
    state: &State<AppState>,
) -> Result<Json<OutlierReport>, ErrorResponse> {
    let keywords = parse_keywords(keywords.as_deref().unwrap_or_default());
    let min_keywords = state.scan.min_keywords.max(1);
    if keywords.len() < min_keywords {
        return Err(ErrorResponse::bad_request(format!(
            "At least {min_keywords} non-empty keyword(s) required, got {}",
            keywords.len()
        )));
    }

    match outlier_service::scan_for_outliers(
        state.source.as_ref(),
        &state.scan,
        &keywords,
        chrono::Utc::now(),
    )
    .await
    {
        Ok(report) => {
            info!("Scan finished: {}", report.message);
            Ok(Json(report))
        }
        Err(e) => {
            error!("Outlier scan failed: {e:#}");
            Err(ErrorResponse::upstream(format!("{e:#}")))
        }
    }
}
