//! Prompt construction for both analysis paths.
//!
//! The comment path embeds a preprocessed comment block into a fixed template
//! whose JSON skeleton is the output contract handed to the model. The metric
//! path renders one template per [`TaskKind`] from a [`MetricBundle`].

mod template;
mod templates;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// The closed set of chart insight tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Engagement,
    Growth,
    Upload,
    ContentPerformance,
    CoreFans,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Engagement,
        TaskKind::Growth,
        TaskKind::Upload,
        TaskKind::ContentPerformance,
        TaskKind::CoreFans,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Engagement => "engagement",
            TaskKind::Growth => "growth",
            TaskKind::Upload => "upload",
            TaskKind::ContentPerformance => "content_performance",
            TaskKind::CoreFans => "core_fans",
        }
    }

    fn template(self) -> &'static str {
        match self {
            TaskKind::Engagement => templates::ENGAGEMENT_TEMPLATE,
            TaskKind::Growth => templates::GROWTH_TEMPLATE,
            TaskKind::Upload => templates::UPLOAD_TEMPLATE,
            TaskKind::ContentPerformance => templates::CONTENT_PERFORMANCE_TEMPLATE,
            TaskKind::CoreFans => templates::CORE_FANS_TEMPLATE,
        }
    }

    /// Parameter names this task's template references.
    #[must_use]
    pub fn required_parameters(self) -> Vec<&'static str> {
        template::placeholder_names(self.template())
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| InsightError::UnknownTask(s.to_string()))
    }
}

/// A numeric or categorical template value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Convert a JSON number or string; anything else is `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(MetricValue::Integer)
                .or_else(|| n.as_f64().map(MetricValue::Float)),
            serde_json::Value::String(s) => Some(MetricValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Render with `digits` fractional digits, as a `{name:.Nf}` placeholder asks.
    ///
    /// Text is accepted when it parses as a number.
    ///
    /// # Errors
    ///
    /// Returns a reason string when the value is not numeric.
    pub fn to_fixed(&self, digits: usize) -> Result<String, String> {
        #[allow(clippy::cast_precision_loss)]
        let number = match self {
            MetricValue::Integer(v) => *v as f64,
            MetricValue::Float(v) => *v,
            MetricValue::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{raw}' is not a number"))?,
        };
        Ok(format!("{number:.digits$}"))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{v}"),
            // Whole floats keep one fractional digit so `5.0` does not read as a count.
            MetricValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            MetricValue::Float(v) => write!(f, "{v}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<u32> for MetricValue {
    fn from(v: u32) -> Self {
        MetricValue::Integer(i64::from(v))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// A chart task plus the values its template needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    pub task: TaskKind,
    pub params: BTreeMap<String, MetricValue>,
}

impl MetricBundle {
    #[must_use]
    pub fn new(task: TaskKind) -> Self {
        Self {
            task,
            params: BTreeMap::new(),
        }
    }

    /// Build from a raw task identifier, as supplied by an outer caller.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::UnknownTask`] if `task` is not a recognized identifier.
    pub fn from_parts(
        task: &str,
        params: BTreeMap<String, MetricValue>,
    ) -> Result<Self, InsightError> {
        Ok(Self {
            task: task.parse()?,
            params,
        })
    }

    /// Build from a raw task identifier and a loosely typed JSON object.
    ///
    /// Only the names the task's template references are read; any other key
    /// is ignored whatever its type. Absent names are left for rendering to
    /// report.
    ///
    /// # Errors
    ///
    /// - [`InsightError::UnknownTask`] if `task` is not a recognized identifier.
    /// - [`InsightError::InvalidParameter`] if a referenced value is not a number or a string.
    pub fn from_json(
        task: &str,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, InsightError> {
        let task: TaskKind = task.parse()?;
        let mut params = BTreeMap::new();
        for name in task.required_parameters() {
            let Some(raw) = data.get(name) else {
                continue;
            };
            let value = MetricValue::from_json(raw).ok_or_else(|| InsightError::InvalidParameter {
                task,
                parameter: name.to_string(),
                reason: format!("expected a number or a string, got {raw}"),
            })?;
            params.insert(name.to_string(), value);
        }
        Ok(Self { task, params })
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// A persona instruction paired with the rendered user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: &'static str,
    pub user: String,
}

/// Embed a preprocessed comment block into the comment-analysis template.
#[must_use]
pub fn build_comment_prompt(comment_block: &str) -> RenderedPrompt {
    RenderedPrompt {
        system: templates::COMMENT_SYSTEM_PROMPT,
        user: format!(
            "{}\n\n{comment_block}\n\n{}",
            templates::COMMENT_PROMPT_HEADER,
            templates::COMMENT_SCHEMA_CONTRACT
        ),
    }
}

/// Render the bundle's task template with the channel-analyst persona.
///
/// # Errors
///
/// - [`InsightError::MissingParameter`] if a referenced parameter is absent.
/// - [`InsightError::InvalidParameter`] if a value cannot satisfy its placeholder's format.
pub fn build_metric_prompt(bundle: &MetricBundle) -> Result<RenderedPrompt, InsightError> {
    let user = template::render(bundle.task, bundle.task.template(), &bundle.params)?;
    Ok(RenderedPrompt {
        system: templates::CHART_SYSTEM_PROMPT,
        user,
    })
}

#[cfg(test)]
#[path = "../prompt_test.rs"]
mod tests;
