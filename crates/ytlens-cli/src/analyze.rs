//! Command handlers. Each one builds what it needs from configuration and
//! prints its result to stdout.

use std::path::Path;

use ytlens_insight::{
    ChartInsight, InsightEngine, MetricBundle, MetricValue, ModelSelection, OpenAiClient,
    OpenAiSettings, Sampling, TaskKind,
};

use crate::input::{load_comments, load_params, merge_params};

fn build_engine(seed: Option<u64>) -> anyhow::Result<InsightEngine<OpenAiClient>> {
    let config = ytlens_core::load_app_config()?;
    tracing::debug!(config = ?config, "configuration loaded");

    let client = OpenAiClient::new(&OpenAiSettings {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        timeout_secs: config.request_timeout_secs,
    })?;

    Ok(InsightEngine::new(
        client,
        ModelSelection {
            comment_model: config.comment_model,
            chart_model: config.chart_model,
        },
        Sampling::from_seed(seed.or(config.sampling_seed)),
    ))
}

pub(crate) fn run_prepare(input: &Path, seed: Option<u64>) -> anyhow::Result<()> {
    let comments = load_comments(input)?;
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let mut rng = Sampling::from_seed(seed).rng();
    println!("{}", ytlens_insight::prepare_comments(&texts, &mut rng));
    Ok(())
}

pub(crate) async fn run_comments(input: &Path, seed: Option<u64>) -> anyhow::Result<()> {
    let comments = load_comments(input)?;
    let engine = build_engine(seed)?;

    let outcome = engine.analyze_comments_outcome(&comments).await;
    if let Some(e) = outcome.failure() {
        tracing::warn!(error = %e, "comment analysis returned a degraded result");
    }
    let result = outcome.into_result();
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) async fn run_chart(
    task: &str,
    params: Vec<(String, MetricValue)>,
    data: Option<&Path>,
) -> anyhow::Result<()> {
    let base = match data {
        Some(path) => load_params(path)?,
        None => serde_json::Map::new(),
    };
    let values = merge_params(base, params)?;

    let bundle = MetricBundle::from_json(task, &values)?;
    let engine = build_engine(None)?;

    match engine.analyze_chart(&bundle).await? {
        ChartInsight::Insight(text) => {
            println!("{text}");
            Ok(())
        }
        ChartInsight::Unavailable { reason } => {
            anyhow::bail!("chart insight unavailable: {reason}")
        }
    }
}

pub(crate) fn run_tasks() {
    for task in TaskKind::ALL {
        println!("{task}: {}", task.required_parameters().join(", "));
    }
}
