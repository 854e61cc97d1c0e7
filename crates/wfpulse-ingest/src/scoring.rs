//! Popularity scoring heuristics.
//!
//! Each platform maps its raw engagement counters onto a weighted sum of
//! capped terms, producing a score in `[0, 1]`. Scoring also derives the
//! per-platform engagement ratios and writes them back into the metric
//! struct, so a scored record always carries both.

use wfpulse_core::{ForumMetrics, GoogleMetrics, Metrics, YouTubeMetrics};

/// Division that treats a zero denominator as zero instead of dividing.
#[must_use]
pub fn safe_div(n: f64, d: f64) -> f64 {
    if d == 0.0 {
        0.0
    } else {
        n / d
    }
}

fn cap(x: f64) -> f64 {
    x.min(1.0)
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn round6(x: f64) -> f64 {
    (x * 1_000_000.0).round() / 1_000_000.0
}

/// Augment `metrics` with its derived ratio fields and return the platform
/// popularity score, clamped to `[0, 1]` and rounded to 6 decimals.
pub fn compute_popularity(metrics: &mut Metrics) -> f64 {
    match metrics {
        Metrics::YouTube(m) => youtube_score(m),
        Metrics::Forum(m) => forum_score(m),
        Metrics::Google(m) => google_score(m),
    }
}

#[allow(clippy::cast_precision_loss)]
fn youtube_score(m: &mut YouTubeMetrics) -> f64 {
    let views = m.views as f64;
    let likes = m.likes as f64;
    let comments = m.comments as f64;

    let lvr = round6(safe_div(likes, views));
    m.like_to_view_ratio = Some(lvr);
    m.comment_to_view_ratio = Some(round6(safe_div(comments, views)));

    // Normalization caps tuned for the observed range of workflow-tutorial
    // videos; a viral outlier saturates at 1.0 rather than skewing the rest.
    let v = cap(views / 200_000.0);
    let l = cap(likes / 5_000.0);
    let c = cap(comments / 1_000.0);

    let score = 0.45 * v + 0.30 * l + 0.15 * c + 0.10 * cap(lvr * 50.0);
    round6(cap(score))
}

#[allow(clippy::cast_precision_loss)]
fn forum_score(m: &mut ForumMetrics) -> f64 {
    let views = m.views as f64;
    let replies = m.replies as f64;
    let likes = m.likes as f64;
    let contributors = m.contributors as f64;

    m.reply_to_view_ratio = Some(round6(safe_div(replies, views)));
    m.like_to_view_ratio = Some(round6(safe_div(likes, views)));

    let v = cap(views / 20_000.0);
    let r = cap(replies / 200.0);
    let l = cap(likes / 300.0);
    let u = cap(contributors / 60.0);

    round6(cap(0.4 * v + 0.3 * r + 0.2 * l + 0.1 * u))
}

fn google_score(m: &mut GoogleMetrics) -> f64 {
    let msv = m.monthly_search_volume.unwrap_or(0.0);

    let v = cap(msv / 100_000.0);
    let i = cap(m.interest_score / 100.0);
    // trend_30d_change is a fraction around 0; shifting by 0.5 maps the
    // [-0.5, +0.5] band onto [0, 1].
    let t = clamp01(m.trend_30d_change + 0.5);

    round6(cap(0.5 * v + 0.3 * i + 0.2 * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn safe_div_zero_denominator_is_zero() {
        assert_close(safe_div(5.0, 0.0), 0.0);
        assert_close(safe_div(0.0, 0.0), 0.0);
        assert_close(safe_div(-3.0, 0.0), 0.0);
    }

    #[test]
    fn safe_div_regular_division() {
        assert_close(safe_div(1.0, 4.0), 0.25);
    }

    #[test]
    fn youtube_score_saturates_at_one() {
        // views, likes, comments all at their caps and the like ratio term
        // saturated: 0.45 + 0.30 + 0.15 + 0.10.
        let mut metrics = Metrics::YouTube(YouTubeMetrics::new(200_000, 5_000, 1_000));
        let score = compute_popularity(&mut metrics);
        assert_close(score, 1.0);

        let Metrics::YouTube(m) = &metrics else {
            panic!("variant changed");
        };
        assert_close(m.like_to_view_ratio.unwrap(), 0.025);
        assert_close(m.comment_to_view_ratio.unwrap(), 0.005);
    }

    #[test]
    fn youtube_score_zero_everything() {
        let mut metrics = Metrics::YouTube(YouTubeMetrics::new(0, 0, 0));
        let score = compute_popularity(&mut metrics);
        assert_close(score, 0.0);
        let Metrics::YouTube(m) = &metrics else {
            panic!("variant changed");
        };
        assert_close(m.like_to_view_ratio.unwrap(), 0.0);
    }

    #[test]
    fn youtube_score_midrange() {
        // 100k views, 1k likes, 100 comments:
        // 0.45*0.5 + 0.30*0.2 + 0.15*0.1 + 0.10*min(1, 0.01*50) = 0.35
        let mut metrics = Metrics::YouTube(YouTubeMetrics::new(100_000, 1_000, 100));
        assert_close(compute_popularity(&mut metrics), 0.35);
    }

    #[test]
    fn forum_score_saturates_at_one() {
        let mut metrics = Metrics::Forum(ForumMetrics::new(20_000, 200, 300, 60));
        assert_close(compute_popularity(&mut metrics), 1.0);
    }

    #[test]
    fn forum_score_sets_ratios() {
        let mut metrics = Metrics::Forum(ForumMetrics::new(1_000, 10, 25, 5));
        let score = compute_popularity(&mut metrics);
        let Metrics::Forum(m) = &metrics else {
            panic!("variant changed");
        };
        assert_close(m.reply_to_view_ratio.unwrap(), 0.01);
        assert_close(m.like_to_view_ratio.unwrap(), 0.025);
        // 0.4*0.05 + 0.3*0.05 + 0.2*(25/300) + 0.1*(5/60)
        assert_close(score, round6(0.02 + 0.015 + 0.2 * (25.0 / 300.0) + 0.1 * (5.0 / 60.0)));
    }

    #[test]
    fn google_score_without_search_volume() {
        // interest 50, flat trend: 0.5*0 + 0.3*0.5 + 0.2*0.5 = 0.25
        let mut metrics = Metrics::Google(GoogleMetrics {
            interest_score: 50.0,
            trend_30d_change: 0.0,
            monthly_search_volume: None,
        });
        assert_close(compute_popularity(&mut metrics), 0.25);
    }

    #[test]
    fn google_score_clamps_steep_decline() {
        // A -80% trend shifts below zero and clamps to 0 on the trend term.
        let mut metrics = Metrics::Google(GoogleMetrics {
            interest_score: 0.0,
            trend_30d_change: -0.8,
            monthly_search_volume: None,
        });
        assert_close(compute_popularity(&mut metrics), 0.0);
    }

    #[test]
    fn google_score_caps_interest_above_scale() {
        let mut metrics = Metrics::Google(GoogleMetrics {
            interest_score: 250.0,
            trend_30d_change: 2.0,
            monthly_search_volume: Some(1_000_000.0),
        });
        // every term saturated: 0.5 + 0.3 + 0.2
        assert_close(compute_popularity(&mut metrics), 1.0);
    }

    #[test]
    fn all_scores_stay_in_unit_interval() {
        let extremes: Vec<Metrics> = vec![
            Metrics::YouTube(YouTubeMetrics::new(u64::MAX / 2, u64::MAX / 2, u64::MAX / 2)),
            Metrics::Forum(ForumMetrics::new(u64::MAX / 2, 0, u64::MAX / 2, 1)),
            Metrics::Google(GoogleMetrics {
                interest_score: 1e9,
                trend_30d_change: 1e9,
                monthly_search_volume: Some(1e12),
            }),
        ];
        for mut metrics in extremes {
            let score = compute_popularity(&mut metrics);
            assert!((0.0..=1.0).contains(&score), "score out of bounds: {score}");
        }
    }
}
