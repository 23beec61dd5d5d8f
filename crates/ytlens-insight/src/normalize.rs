//! Coercion of raw model output into the canonical result shapes.
//!
//! The comment path never fails: any upstream error, parse failure, or schema
//! violation becomes [`CommentOutcome::Degraded`], which flattens to
//! [`AnalysisResult::error`]. The chart path maps failures to
//! [`ChartInsight::Unavailable`].

use crate::error::InsightError;
use crate::types::{AnalysisResult, ChartInsight};

/// Allowed drift of the three sentiment percentages from a 100 total.
pub const SENTIMENT_SUM_TOLERANCE: f64 = 5.0;

/// Parse and validate a raw comment-analysis reply.
///
/// Every field of the canonical shape must be present with the right type.
/// Sentiment percentages must be finite, within `0..=100`, and sum to 100
/// within [`SENTIMENT_SUM_TOLERANCE`].
///
/// # Errors
///
/// Returns [`InsightError::MalformedResponse`] describing the first violation.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, InsightError> {
    let body = strip_code_fence(raw);
    let result: AnalysisResult = serde_json::from_str(body)
        .map_err(|e| InsightError::MalformedResponse(format!("not a valid analysis object: {e}")))?;
    validate_sentiment(&result)?;
    Ok(result)
}

fn validate_sentiment(result: &AnalysisResult) -> Result<(), InsightError> {
    let s = &result.sentiment;
    for (label, value) in [
        ("positive", s.positive),
        ("negative", s.negative),
        ("neutral", s.neutral),
    ] {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(InsightError::MalformedResponse(format!(
                "sentiment.{label} = {value} is not a percentage"
            )));
        }
    }

    let total = s.positive + s.negative + s.neutral;
    if (total - 100.0).abs() > SENTIMENT_SUM_TOLERANCE {
        return Err(InsightError::MalformedResponse(format!(
            "sentiment percentages sum to {total}, expected about 100"
        )));
    }
    Ok(())
}

/// Drop a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// How the comment path ended, before it is flattened into an [`AnalysisResult`].
#[derive(Debug)]
pub enum CommentOutcome {
    /// The model reply parsed and validated.
    Analyzed(AnalysisResult),
    /// No comment survived preprocessing; the backend was not called.
    NothingToAnalyze,
    /// The request or the reply failed.
    Degraded(InsightError),
}

impl CommentOutcome {
    /// The failure behind a degraded outcome.
    #[must_use]
    pub fn failure(&self) -> Option<&InsightError> {
        match self {
            CommentOutcome::Degraded(e) => Some(e),
            CommentOutcome::Analyzed(_) | CommentOutcome::NothingToAnalyze => None,
        }
    }

    /// Flatten into the canonical shape: [`AnalysisResult::empty`] when there
    /// was nothing to analyze, [`AnalysisResult::error`] on failure.
    #[must_use]
    pub fn into_result(self) -> AnalysisResult {
        match self {
            CommentOutcome::Analyzed(result) => result,
            CommentOutcome::NothingToAnalyze => AnalysisResult::empty(),
            CommentOutcome::Degraded(e) => AnalysisResult::error(e.to_string()),
        }
    }
}

/// Final stage of the comment path.
#[must_use]
pub fn normalize_comment_analysis(outcome: Result<String, InsightError>) -> CommentOutcome {
    match outcome.and_then(|raw| parse_analysis(&raw)) {
        Ok(result) => CommentOutcome::Analyzed(result),
        Err(e) => {
            tracing::warn!(
                error = %e,
                upstream = e.is_upstream(),
                "comment analysis degraded to error result"
            );
            CommentOutcome::Degraded(e)
        }
    }
}

/// Final stage of the chart path. Successful text passes through unchanged.
#[must_use]
pub fn normalize_chart_insight(outcome: Result<String, InsightError>) -> ChartInsight {
    match outcome {
        Ok(text) if !text.trim().is_empty() => ChartInsight::Insight(text),
        Ok(_) => {
            tracing::warn!("chart insight unavailable: model returned blank text");
            ChartInsight::Unavailable {
                reason: "model returned blank text".to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "chart insight unavailable");
            ChartInsight::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
