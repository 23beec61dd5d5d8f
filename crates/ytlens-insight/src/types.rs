use serde::{Deserialize, Serialize};

/// Feedback `type` used for the single diagnostic entry of a degraded result.
pub const ERROR_FEEDBACK_TYPE: &str = "error";

/// A single viewer comment handed over by the metadata collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body. May be empty or whitespace-only.
    pub text: String,
    /// Opaque collaborator data (author, likes, timestamps). Never inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Comment {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Canonical comment-analysis result. Every field is present on success and failure alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub keywords: Vec<KeywordInsight>,
    pub sentiment: SentimentBreakdown,
    pub categories: Vec<CategoryInsight>,
    pub feedback: Vec<FeedbackItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordInsight {
    pub word: String,
    pub count: u64,
    pub examples: Vec<String>,
}

/// Sentiment split in percent, with representative comments per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub examples: SentimentExamples,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentExamples {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInsight {
    pub name: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub examples: Vec<String>,
}

impl SentimentBreakdown {
    /// All-neutral split with no examples.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 100.0,
            examples: SentimentExamples::default(),
        }
    }
}

impl AnalysisResult {
    /// Result for "nothing to analyze": empty lists, fully neutral, no feedback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            sentiment: SentimentBreakdown::neutral(),
            categories: Vec::new(),
            feedback: Vec::new(),
        }
    }

    /// Degraded result carrying a single diagnostic feedback entry.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            feedback: vec![FeedbackItem {
                kind: ERROR_FEEDBACK_TYPE.to_string(),
                content: message.into(),
                examples: Vec::new(),
            }],
            ..Self::empty()
        }
    }
}

/// Outcome of the chart (metric) path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartInsight {
    /// One short natural-language sentence from the model, unchanged.
    Insight(String),
    /// No insight could be produced; `reason` is diagnostic only.
    Unavailable { reason: String },
}

impl ChartInsight {
    /// The insight text, or `None` when unavailable.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            ChartInsight::Insight(text) => Some(text),
            ChartInsight::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            ChartInsight::Insight(text) => Some(text),
            ChartInsight::Unavailable { .. } => None,
        }
    }
}
