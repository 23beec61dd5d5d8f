//! Reading comment batches and chart parameters from the command line.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};
use ytlens_insight::{Comment, MetricValue};

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentInput {
    Text(String),
    Record(Comment),
}

impl From<CommentInput> for Comment {
    fn from(input: CommentInput) -> Self {
        match input {
            CommentInput::Text(text) => Comment::new(text),
            CommentInput::Record(comment) => comment,
        }
    }
}

/// Parse a JSON array whose items are strings or objects with a `text` field.
pub(crate) fn parse_comments(raw: &str) -> anyhow::Result<Vec<Comment>> {
    let items: Vec<CommentInput> = serde_json::from_str(raw)
        .context("expected a JSON array of strings or {\"text\": ...} objects")?;
    Ok(items.into_iter().map(Comment::from).collect())
}

pub(crate) fn load_comments(path: &Path) -> anyhow::Result<Vec<Comment>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_comments(&raw).with_context(|| format!("invalid comment file {}", path.display()))
}

pub(crate) fn load_params(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} must hold a JSON object", path.display()))
}

/// Overlay `--param` values on a `--data` object; the flags win.
pub(crate) fn merge_params(
    mut base: Map<String, Value>,
    params: Vec<(String, MetricValue)>,
) -> anyhow::Result<Map<String, Value>> {
    for (name, value) in params {
        base.insert(name, serde_json::to_value(value)?);
    }
    Ok(base)
}

/// `name=value`, where the value becomes an integer, a float, or text, in that order.
pub(crate) fn parse_param(raw: &str) -> Result<(String, MetricValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }

    let value = value.trim();
    let value = if let Ok(v) = value.parse::<i64>() {
        MetricValue::Integer(v)
    } else if let Ok(v) = value.parse::<f64>() {
        MetricValue::Float(v)
    } else {
        MetricValue::Text(value.to_string())
    };
    Ok((name.to_string(), value))
}
