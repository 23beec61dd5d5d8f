//! Comment and metric insight pipeline for ytlens.
//!
//! Samples and truncates viewer comments, renders analysis prompts, sends them
//! to an OpenAI-compatible chat backend, and normalizes the replies into
//! dashboard-ready shapes. Chart tasks render Korean metric templates and come
//! back as a single sentence.

pub mod error;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod prompt;
pub mod requester;
pub mod types;

pub use error::InsightError;
pub use normalize::{
    normalize_chart_insight, normalize_comment_analysis, parse_analysis, CommentOutcome,
};
pub use pipeline::{InsightEngine, ModelSelection, Stage};
pub use preprocess::{prepare_comments, Sampling};
pub use prompt::{
    build_comment_prompt, build_metric_prompt, MetricBundle, MetricValue, RenderedPrompt, TaskKind,
};
pub use requester::{ChatBackend, ChatRequest, OpenAiClient, OpenAiSettings, ResponseMode};
pub use types::{
    AnalysisResult, CategoryInsight, ChartInsight, Comment, FeedbackItem, KeywordInsight,
    SentimentBreakdown, SentimentExamples,
};
