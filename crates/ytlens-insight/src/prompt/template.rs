//! Named-placeholder rendering for metric templates.
//!
//! Supports `{name}`, fixed-precision `{name:.Nf}`, and `{{` / `}}` escapes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{MetricValue, TaskKind};
use crate::error::InsightError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)(?::\.(\d+)f)?\}")
        .expect("valid placeholder regex")
});

/// Distinct placeholder names in order of first appearance.
pub(super) fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = caps.get(1) {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
    }
    names
}

/// Substitute every placeholder in `template` from `params`.
///
/// # Errors
///
/// - [`InsightError::MissingParameter`] for the first referenced name absent from `params`.
/// - [`InsightError::InvalidParameter`] when a value cannot be shown at the requested precision.
pub(super) fn render(
    task: TaskKind,
    template: &str,
    params: &BTreeMap<String, MetricValue>,
) -> Result<String, InsightError> {
    let mut out = String::with_capacity(template.len() + 64);
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let Some(name) = caps.get(1) else {
            // `{{` or `}}`
            out.push_str(&whole.as_str()[..1]);
            continue;
        };

        let value = params
            .get(name.as_str())
            .ok_or_else(|| InsightError::MissingParameter {
                task,
                parameter: name.as_str().to_string(),
            })?;

        let invalid = |reason: String| InsightError::InvalidParameter {
            task,
            parameter: name.as_str().to_string(),
            reason,
        };

        let precision = caps
            .get(2)
            .map(|p| p.as_str().parse::<usize>())
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        let rendered = match precision {
            Some(digits) => value.to_fixed(digits).map_err(invalid)?,
            None => value.to_string(),
        };
        out.push_str(&rendered);
    }

    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, MetricValue)]) -> BTreeMap<String, MetricValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn substitutes_named_values() {
        let out = render(
            TaskKind::Growth,
            "views: {total_views}, avg: {avg_views}",
            &params(&[
                ("total_views", MetricValue::Integer(1200)),
                ("avg_views", MetricValue::Float(40.5)),
            ]),
        )
        .expect("render");
        assert_eq!(out, "views: 1200, avg: 40.5");
    }

    #[test]
    fn fixed_precision_rounds_numbers() {
        let out = render(
            TaskKind::CoreFans,
            "{avg:.1f}/{count:.2f}",
            &params(&[
                ("avg", MetricValue::Float(3.456)),
                ("count", MetricValue::Integer(4)),
            ]),
        )
        .expect("render");
        assert_eq!(out, "3.5/4.00");
    }

    #[test]
    fn fixed_precision_accepts_numeric_text() {
        let out = render(
            TaskKind::CoreFans,
            "{avg:.1f}",
            &params(&[("avg", MetricValue::Text(" 2.26 ".to_string()))]),
        )
        .expect("render");
        assert_eq!(out, "2.3");
    }

    #[test]
    fn fixed_precision_rejects_non_numeric_text() {
        let err = render(
            TaskKind::CoreFans,
            "{avg:.1f}",
            &params(&[("avg", MetricValue::Text("lots".to_string()))]),
        )
        .unwrap_err();
        assert!(
            matches!(err, InsightError::InvalidParameter { ref parameter, .. } if parameter == "avg"),
            "expected InvalidParameter(avg), got: {err:?}"
        );
    }

    #[test]
    fn missing_value_is_reported_by_name() {
        let err = render(
            TaskKind::Engagement,
            "{like_ratio} {comment_ratio}",
            &params(&[("like_ratio", MetricValue::Float(1.0))]),
        )
        .unwrap_err();
        assert!(
            matches!(err, InsightError::MissingParameter { task: TaskKind::Engagement, ref parameter } if parameter == "comment_ratio"),
            "expected MissingParameter(comment_ratio), got: {err:?}"
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let out = render(
            TaskKind::Upload,
            "{{literal}} {top_day}",
            &params(&[("top_day", MetricValue::Text("월".to_string()))]),
        )
        .expect("render");
        assert_eq!(out, "{literal} 월");
    }

    #[test]
    fn substituted_values_are_not_re_rendered() {
        let out = render(
            TaskKind::Upload,
            "{top_day}",
            &params(&[("top_day", MetricValue::Text("{other}".to_string()))]),
        )
        .expect("render");
        assert_eq!(out, "{other}");
    }

    #[test]
    fn placeholder_names_are_distinct_and_ordered() {
        let names = placeholder_names("{b} {a:.1f} {b} {{c}}");
        assert_eq!(names, vec!["b", "a"]);
    }
}
