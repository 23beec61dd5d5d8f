//! Per-request orchestration: build, request, normalize.
//!
//! [`InsightEngine`] is constructed once at startup and shared read-only
//! across concurrent requests. Each call walks the [`Stage`] sequence
//! `BUILDING → REQUESTING → NORMALIZING → {DONE, FAILED}` with no retries.

use std::fmt;

use crate::error::InsightError;
use crate::normalize::{normalize_chart_insight, normalize_comment_analysis, CommentOutcome};
use crate::preprocess::{prepare_comments, Sampling};
use crate::prompt::{build_comment_prompt, build_metric_prompt, MetricBundle};
use crate::requester::{ChatBackend, ChatRequest};
use crate::types::{AnalysisResult, ChartInsight, Comment};

/// Per-request pipeline state, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Building,
    Requesting,
    Normalizing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Building => "BUILDING",
            Stage::Requesting => "REQUESTING",
            Stage::Normalizing => "NORMALIZING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        })
    }
}

fn enter(path: &'static str, stage: Stage) {
    tracing::debug!(path, stage = %stage, "analysis stage");
}

/// Model names per analysis path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub comment_model: String,
    pub chart_model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            comment_model: "gpt-4-turbo-preview".to_string(),
            chart_model: "gpt-4".to_string(),
        }
    }
}

/// Process-wide analysis handle over a [`ChatBackend`].
pub struct InsightEngine<B> {
    backend: B,
    models: ModelSelection,
    sampling: Sampling,
}

impl<B: ChatBackend> InsightEngine<B> {
    #[must_use]
    pub fn new(backend: B, models: ModelSelection, sampling: Sampling) -> Self {
        Self {
            backend,
            models,
            sampling,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    /// Run the preprocessor with a request-local RNG.
    #[must_use]
    pub fn prepare<S: AsRef<str>>(&self, texts: &[S]) -> String {
        let mut rng = self.sampling.rng();
        prepare_comments(texts, &mut rng)
    }

    /// Analyze a batch of comment records.
    ///
    /// Always returns a fully shaped result: [`AnalysisResult::empty`] when no
    /// comment survives preprocessing, [`AnalysisResult::error`] on any
    /// upstream or parse failure.
    pub async fn analyze_comments(&self, comments: &[Comment]) -> AnalysisResult {
        self.analyze_comments_outcome(comments).await.into_result()
    }

    /// Same as [`Self::analyze_comments`], keeping the typed outcome so callers
    /// can tell a failure apart from a model reply.
    pub async fn analyze_comments_outcome(&self, comments: &[Comment]) -> CommentOutcome {
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        self.comment_outcome(&texts).await
    }

    /// Same as [`Self::analyze_comments`], over bare texts.
    pub async fn analyze_comment_texts<S>(&self, texts: &[S]) -> AnalysisResult
    where
        S: AsRef<str> + Sync,
    {
        self.comment_outcome(texts).await.into_result()
    }

    async fn comment_outcome<S>(&self, texts: &[S]) -> CommentOutcome
    where
        S: AsRef<str> + Sync,
    {
        enter("comments", Stage::Building);
        let block = self.prepare(texts);
        if block.is_empty() {
            tracing::info!(submitted = texts.len(), "no comments to analyze");
            enter("comments", Stage::Done);
            return CommentOutcome::NothingToAnalyze;
        }

        let request =
            ChatRequest::comment_analysis(&self.models.comment_model, build_comment_prompt(&block));

        enter("comments", Stage::Requesting);
        let reply = self.backend.complete(&request).await;

        enter("comments", Stage::Normalizing);
        let outcome = normalize_comment_analysis(reply);
        enter(
            "comments",
            match outcome {
                CommentOutcome::Degraded(_) => Stage::Failed,
                CommentOutcome::Analyzed(_) | CommentOutcome::NothingToAnalyze => Stage::Done,
            },
        );
        outcome
    }

    /// Produce a one-sentence insight for a metric bundle.
    ///
    /// Upstream failures are not errors here: they come back as
    /// [`ChartInsight::Unavailable`].
    ///
    /// # Errors
    ///
    /// [`InsightError::MissingParameter`] or [`InsightError::InvalidParameter`]
    /// when the bundle cannot render its template.
    pub async fn analyze_chart(&self, bundle: &MetricBundle) -> Result<ChartInsight, InsightError> {
        enter("chart", Stage::Building);
        let prompt = build_metric_prompt(bundle).inspect_err(|e| {
            tracing::warn!(task = %bundle.task, error = %e, "chart request rejected");
            enter("chart", Stage::Failed);
        })?;
        let request = ChatRequest::chart_insight(&self.models.chart_model, prompt);

        enter("chart", Stage::Requesting);
        let outcome = self.backend.complete(&request).await;

        enter("chart", Stage::Normalizing);
        let insight = normalize_chart_insight(outcome);
        enter(
            "chart",
            match insight {
                ChartInsight::Insight(_) => Stage::Done,
                ChartInsight::Unavailable { .. } => Stage::Failed,
            },
        );
        Ok(insight)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
