//! Derivation of chart [`MetricBundle`]s from channel data.
//!
//! These mirror what the dashboard computes before asking for a chart insight.
//! Every helper returns `None` when the input holds nothing usable.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::prompt::{MetricBundle, TaskKind};

/// Core fans need at least this many comments on the channel.
pub const CORE_FAN_MIN_COMMENTS: usize = 3;

/// At most this many core fans are considered.
pub const CORE_FAN_LIMIT: usize = 10;

const WEEKDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid duration regex")
});

/// Per-video statistics from the metadata collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// ISO 8601 duration, e.g. `PT12M5S`.
    pub duration: String,
    pub published_at: DateTime<Utc>,
}

/// A comment left anywhere on the channel, with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelComment {
    pub author: String,
    #[serde(default)]
    pub author_channel_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub like_count: u64,
    pub video_id: String,
    pub published_at: DateTime<Utc>,
}

/// Length buckets used by the content-performance chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    /// Up to one minute.
    Shorts,
    /// Over one minute and under ten.
    ///
    /// The content-performance prompt's "10분 미만" line reports this bucket
    /// alone. `shorts_views` is still emitted in the bundle, but no template
    /// line references it.
    Short,
    /// Ten to twenty minutes.
    Medium,
    /// Twenty minutes or more.
    Long,
}

impl DurationBucket {
    const ALL: [DurationBucket; 4] = [
        DurationBucket::Shorts,
        DurationBucket::Short,
        DurationBucket::Medium,
        DurationBucket::Long,
    ];

    #[must_use]
    pub fn from_seconds(seconds: u64) -> Self {
        match seconds {
            0..=60 => DurationBucket::Shorts,
            61..=599 => DurationBucket::Short,
            600..=1199 => DurationBucket::Medium,
            _ => DurationBucket::Long,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::Shorts => "쇼츠",
            DurationBucket::Short => "10분 미만",
            DurationBucket::Medium => "10-20분",
            DurationBucket::Long => "20분 이상",
        }
    }

    fn param(self) -> &'static str {
        match self {
            DurationBucket::Shorts => "shorts_views",
            DurationBucket::Short => "short_views",
            DurationBucket::Medium => "medium_views",
            DurationBucket::Long => "long_views",
        }
    }
}

/// Parse an ISO 8601 duration (`P#DT#H#M#S`, any part optional) into seconds.
#[must_use]
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let caps = ISO_DURATION.captures(raw.trim())?;
    let part = |i: usize| -> Option<u64> {
        caps.get(i)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };
    Some(
        part(1)?
            .saturating_mul(86_400)
            .saturating_add(part(2)?.saturating_mul(3_600))
            .saturating_add(part(3)?.saturating_mul(60))
            .saturating_add(part(4)?),
    )
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: u64, whole: u64) -> f64 {
    part as f64 / whole as f64
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10_f64.powi(digits);
    (value * scale).round() / scale
}

#[allow(clippy::cast_possible_truncation)]
fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

fn watched(videos: &[VideoStats]) -> Vec<&VideoStats> {
    videos.iter().filter(|v| v.view_count > 0).collect()
}

/// Mean like and comment percentages over videos with views.
#[must_use]
pub fn engagement_bundle(videos: &[VideoStats]) -> Option<MetricBundle> {
    let watched = watched(videos);
    let like_ratio = mean(
        watched
            .iter()
            .map(|v| ratio(v.like_count, v.view_count) * 100.0),
    )?;
    let comment_ratio = mean(
        watched
            .iter()
            .map(|v| ratio(v.comment_count, v.view_count) * 100.0),
    )?;

    Some(
        MetricBundle::new(TaskKind::Engagement)
            .with("like_ratio", round_to(like_ratio, 2))
            .with("comment_ratio", round_to(comment_ratio, 2))
            .with("total_engagement", round_to(like_ratio + comment_ratio, 2)),
    )
}

/// Total and mean views, plus the newer half's mean over the older half's, in percent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn growth_bundle(videos: &[VideoStats]) -> Option<MetricBundle> {
    let mut watched = watched(videos);
    if watched.is_empty() {
        return None;
    }
    watched.sort_by_key(|v| v.published_at);

    let total_views: u64 = watched.iter().map(|v| v.view_count).sum();
    let avg_views = total_views as f64 / watched.len() as f64;

    let view_growth = if watched.len() < 2 {
        0.0
    } else {
        let half_mean = |half: &[&VideoStats]| mean(half.iter().map(|v| v.view_count as f64));
        let (older, newer) = watched.split_at(watched.len() / 2);
        match (half_mean(older), half_mean(newer)) {
            (Some(old), Some(new)) if old > 0.0 => round_to((new - old) / old * 100.0, 1),
            _ => 0.0,
        }
    };

    Some(
        MetricBundle::new(TaskKind::Growth)
            .with("total_views", i64::try_from(total_views).unwrap_or(i64::MAX))
            .with("avg_views", round_whole(avg_views))
            .with("view_growth", view_growth),
    )
}

/// Busiest upload weekday and hour in `offset`, and mean days between uploads.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn upload_bundle(videos: &[VideoStats], offset: FixedOffset) -> Option<MetricBundle> {
    if videos.is_empty() {
        return None;
    }

    let mut by_day = [0_usize; 7];
    let mut by_hour = [0_usize; 24];
    for video in videos {
        let local = video.published_at.with_timezone(&offset);
        by_day[local.weekday().num_days_from_sunday() as usize] += 1;
        by_hour[local.hour() as usize] += 1;
    }

    let top_day = busiest(&by_day);
    let top_hour = busiest(&by_hour);

    let mut published: Vec<DateTime<Utc>> = videos.iter().map(|v| v.published_at).collect();
    published.sort();
    let upload_interval = mean(
        published
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 86_400.0),
    )
    .map_or(0.0, |days| round_to(days, 1));

    Some(
        MetricBundle::new(TaskKind::Upload)
            .with("top_day", WEEKDAY_LABELS[top_day])
            .with("top_hour", format!("{top_hour}시"))
            .with("upload_interval", upload_interval),
    )
}

/// Index of the largest count; ties go to the lowest index.
fn busiest(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |(best, best_count), (i, &count)| {
            if count > best_count {
                (i, count)
            } else {
                (best, best_count)
            }
        })
        .0
}

/// Mean views per duration bucket and the best bucket's engagement.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn content_performance_bundle(videos: &[VideoStats]) -> Option<MetricBundle> {
    let mut views: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    let mut engagement: BTreeMap<usize, Vec<f64>> = BTreeMap::new();

    for video in watched(videos) {
        let Some(seconds) = parse_iso8601_duration(&video.duration) else {
            tracing::debug!(duration = %video.duration, "skipping video with unparseable duration");
            continue;
        };
        let idx = DurationBucket::ALL
            .iter()
            .position(|b| *b == DurationBucket::from_seconds(seconds))
            .unwrap_or(0);
        views.entry(idx).or_default().push(video.view_count as f64);
        engagement.entry(idx).or_default().push(ratio(
            video.like_count.saturating_add(video.comment_count),
            video.view_count,
        ));
    }

    if views.is_empty() {
        return None;
    }

    let avg_views = |idx: usize| -> f64 {
        views
            .get(&idx)
            .and_then(|v| mean(v.iter().copied()))
            .unwrap_or(0.0)
    };

    let best = (0..DurationBucket::ALL.len()).fold(0, |best, idx| {
        if avg_views(idx) > avg_views(best) {
            idx
        } else {
            best
        }
    });
    let best_engagement = engagement
        .get(&best)
        .and_then(|v| mean(v.iter().copied()))
        .unwrap_or(0.0);

    let mut bundle = MetricBundle::new(TaskKind::ContentPerformance)
        .with("best_duration", DurationBucket::ALL[best].label())
        .with("best_views", round_whole(avg_views(best)))
        .with("best_engagement", round_to(best_engagement * 100.0, 1));
    for (idx, bucket) in DurationBucket::ALL.iter().enumerate() {
        bundle = bundle.with(bucket.param(), round_whole(avg_views(idx)));
    }
    Some(bundle)
}

/// Profile of one frequent commenter.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreFan {
    pub author: String,
    pub comment_count: usize,
    pub total_likes: u64,
    pub unique_videos: usize,
    /// Unique videos commented on, as a percentage of all channel comments.
    pub engagement_rate: f64,
}

/// Rank the channel's most frequent commenters, excluding the channel itself.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn core_fans(
    comments: &[ChannelComment],
    channel_title: &str,
    channel_id: &str,
) -> Vec<CoreFan> {
    struct Tally<'a> {
        comments: usize,
        likes: u64,
        videos: HashSet<&'a str>,
    }

    let owner = channel_title.to_lowercase();
    let mut tallies: BTreeMap<&str, Tally<'_>> = BTreeMap::new();
    for comment in comments {
        let is_owner = comment.author.to_lowercase() == owner
            || (!channel_id.is_empty()
                && comment
                    .author_channel_id
                    .as_deref()
                    .is_some_and(|id| id.contains(channel_id)));
        if is_owner {
            continue;
        }
        let tally = tallies.entry(comment.author.as_str()).or_insert_with(|| Tally {
            comments: 0,
            likes: 0,
            videos: HashSet::new(),
        });
        tally.comments = tally.comments.saturating_add(1);
        tally.likes = tally.likes.saturating_add(comment.like_count);
        tally.videos.insert(comment.video_id.as_str());
    }

    let total_comments = comments.len().max(1);
    let mut fans: Vec<CoreFan> = tallies
        .into_iter()
        .filter(|(_, t)| t.comments >= CORE_FAN_MIN_COMMENTS)
        .map(|(author, t)| CoreFan {
            author: author.to_string(),
            comment_count: t.comments,
            total_likes: t.likes,
            unique_videos: t.videos.len(),
            engagement_rate: t.videos.len() as f64 / total_comments as f64 * 100.0,
        })
        .collect();

    // Stable sort keeps author order among equal counts.
    fans.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
    fans.truncate(CORE_FAN_LIMIT);
    fans
}

/// Summary of the channel's core fan community.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn core_fans_bundle(
    comments: &[ChannelComment],
    channel_title: &str,
    channel_id: &str,
) -> Option<MetricBundle> {
    let fans = core_fans(comments, channel_title, channel_id);
    let top = fans.first()?;

    let avg_comments = mean(fans.iter().map(|f| f.comment_count as f64))?;
    let avg_engagement = mean(fans.iter().map(|f| f.engagement_rate))?;

    Some(
        MetricBundle::new(TaskKind::CoreFans)
            .with("total_core_fans", i64::try_from(fans.len()).unwrap_or(i64::MAX))
            .with(
                "top_fan_comments",
                i64::try_from(top.comment_count).unwrap_or(i64::MAX),
            )
            .with(
                "top_fan_likes",
                i64::try_from(top.total_likes).unwrap_or(i64::MAX),
            )
            .with("top_fan_engagement", round_to(top.engagement_rate, 1))
            .with("avg_comments_per_fan", avg_comments)
            .with("avg_engagement_rate", avg_engagement),
    )
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
