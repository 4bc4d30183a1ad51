//! Outlier detection: subscriber-ratio filter, channel baseline, percentile score and ranking.
//!
//! The score treats a channel's recent view counts as normally distributed. That is an
//! approximation, not a rigorous outlier test.

use crate::models::{ChannelBaseline, ScoredVideo};

/// A candidate needs at least this many views per channel subscriber.
pub const CANDIDATE_VIEW_MULTIPLIER: u64 = 20;

/// Only scores strictly above this survive ranking.
pub const OUTLIER_SCORE_THRESHOLD: f64 = 50.0;

/// Cheap first-pass filter run before any per-channel sample is fetched.
pub fn is_candidate(views: u64, subscribers: u64) -> bool {
    if subscribers == 0 {
        return false;
    }
    u128::from(views) >= u128::from(subscribers) * u128::from(CANDIDATE_VIEW_MULTIPLIER)
}

/// Mean and population standard deviation (divide by N) of a channel's recent views.
///
/// Callers with fewer than two observations use [`baseline_for_candidate`] instead.
pub fn compute_baseline(sample: &[u64]) -> ChannelBaseline {
    if sample.is_empty() {
        return ChannelBaseline {
            mean: 0.0,
            std_dev: 0.0,
        };
    }
    let n = sample.len() as f64;
    let mean = sample.iter().map(|&v| v as f64).sum::<f64>() / n;
    let sq_diff: f64 = sample.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
    ChannelBaseline {
        mean,
        std_dev: (sq_diff / n).sqrt(),
    }
}

/// Baseline for a candidate, falling back to (own views, 0) when the sample is too small.
pub fn baseline_for_candidate(sample: &[u64], candidate_views: u64) -> ChannelBaseline {
    if sample.len() > 1 {
        compute_baseline(sample)
    } else {
        ChannelBaseline {
            mean: candidate_views as f64,
            std_dev: 0.0,
        }
    }
}

/// Percentile (0-100, two decimals) of `views` under the channel's normal baseline.
/// A zero-variance baseline scores exactly 0.
pub fn outlier_score(views: u64, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return 0.0;
    }
    let z = (views as f64 - mean) / std_dev;
    round_to(100.0 * normal_cdf(z), 2)
}

/// Keeps scores above [`OUTLIER_SCORE_THRESHOLD`], most viewed first. Ties keep input order.
pub fn rank(mut scored: Vec<ScoredVideo>) -> Vec<ScoredVideo> {
    scored.retain(|s| s.outlier_score > OUTLIER_SCORE_THRESHOLD);
    scored.sort_by(|a, b| b.video.views.cmp(&a.video.views));
    scored
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26, absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoMetric;

    fn scored(id: &str, views: u64, score: f64) -> ScoredVideo {
        ScoredVideo {
            video: VideoMetric {
                video_id: id.to_string(),
                title: format!("Video {id}"),
                channel_id: "UC1".to_string(),
                channel_name: "Channel".to_string(),
                views,
                published_at: "2026-10-15T10:00:00Z".to_string(),
                published_timestamp: 1_792_058_400,
                video_url: format!("https://www.youtube.com/watch?v={id}"),
            },
            subscribers: 100,
            outlier_score: score,
        }
    }

    #[test]
    fn zero_subscribers_is_never_a_candidate() {
        for views in [0, 1, 20, 1_000_000, u64::MAX] {
            assert!(!is_candidate(views, 0));
        }
    }

    #[test]
    fn candidate_threshold_is_twenty_times_subscribers() {
        assert!(is_candidate(20_000, 1000));
        assert!(is_candidate(25_000, 1000));
        assert!(!is_candidate(19_999, 1000));
        assert!(!is_candidate(15_000, 1000));
        assert!(is_candidate(20, 1));
    }

    #[test]
    fn candidate_filter_does_not_overflow() {
        assert!(!is_candidate(u64::MAX - 1, u64::MAX / 10));
        assert!(!is_candidate(u64::MAX, u64::MAX / 10));
        assert!(!is_candidate(u64::MAX, u64::MAX / 20 + 1));
        assert!(is_candidate(u64::MAX, u64::MAX / 20));
    }

    #[test]
    fn baseline_uses_population_std_dev() {
        let baseline = compute_baseline(&[500, 600, 550, 580, 520]);
        assert!((baseline.mean - 550.0).abs() < 1e-9);
        assert!((baseline.std_dev - 36.8782).abs() < 1e-3);

        let baseline = compute_baseline(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert!((baseline.mean - 5.0).abs() < 1e-9);
        assert!((baseline.std_dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn small_sample_falls_back_to_candidate_views() {
        assert_eq!(
            baseline_for_candidate(&[300], 25_000),
            ChannelBaseline {
                mean: 25_000.0,
                std_dev: 0.0
            }
        );
        assert_eq!(baseline_for_candidate(&[], 7).mean, 7.0);
        assert_eq!(baseline_for_candidate(&[10, 20], 7).mean, 15.0);
    }

    #[test]
    fn zero_std_dev_scores_exactly_zero() {
        assert_eq!(outlier_score(1_000_000, 10.0, 0.0), 0.0);
        assert_eq!(outlier_score(0, 0.0, 0.0), 0.0);
        assert_eq!(outlier_score(5, 5.0, f64::NAN), 0.0);
    }

    #[test]
    fn score_at_mean_is_fiftieth_percentile() {
        let score = outlier_score(550, 550.0, 35.64);
        assert!((score - 50.0).abs() < 0.01, "got {score}");
    }

    #[test]
    fn score_is_monotonic_in_views() {
        let mut previous = outlier_score(0, 1000.0, 250.0);
        for views in (0..3000).step_by(25) {
            let score = outlier_score(views, 1000.0, 250.0);
            assert!(score >= previous, "{views}: {score} < {previous}");
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        let score = outlier_score(1100, 1000.0, 100.0);
        assert_eq!(score, 84.13);
        assert_eq!(outlier_score(900, 1000.0, 100.0), 15.87);
    }

    #[test]
    fn far_outlier_scores_one_hundred() {
        let baseline = compute_baseline(&[500, 600, 550, 580, 520]);
        assert_eq!(outlier_score(25_000, baseline.mean, baseline.std_dev), 100.0);
    }

    #[test]
    fn rank_drops_scores_at_or_below_threshold() {
        let ranked = rank(vec![
            scored("a", 10, 50.0),
            scored("b", 20, 50.01),
            scored("c", 30, 0.0),
            scored("d", 40, 99.0),
        ]);
        let ids: Vec<_> = ranked.iter().map(|s| s.video.video_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b"]);
        assert!(ranked.iter().all(|s| s.outlier_score > OUTLIER_SCORE_THRESHOLD));
    }

    #[test]
    fn rank_sorts_by_views_descending_and_keeps_tie_order() {
        let ranked = rank(vec![
            scored("a", 100, 60.0),
            scored("b", 500, 70.0),
            scored("c", 100, 90.0),
            scored("d", 300, 80.0),
        ]);
        let ids: Vec<_> = ranked.iter().map(|s| s.video.video_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        assert!(ranked.windows(2).all(|w| w[0].video.views >= w[1].video.views));
    }

    #[test]
    fn rank_is_idempotent() {
        let once = rank(vec![
            scored("a", 100, 60.0),
            scored("b", 500, 40.0),
            scored("c", 100, 90.0),
            scored("d", 300, 80.0),
        ]);
        assert_eq!(rank(once.clone()), once);
    }

    #[test]
    fn rank_of_nothing_qualifying_is_empty() {
        assert!(rank(vec![scored("a", 10, 12.5)]).is_empty());
        assert!(rank(Vec::new()).is_empty());
    }
}
