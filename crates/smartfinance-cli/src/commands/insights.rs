//! Prompt preview and insight request commands

use std::path::Path;

use anyhow::{bail, Result};
use smartfinance_core::{emphasis_to_html, InsightRequest, InsightResponse};

use super::{build_pipeline, load_settings, load_store};

/// Output style for `insights`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightFormat {
    Text,
    Html,
    Json,
}

pub fn cmd_prompt(config: Option<&Path>, transactions: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let pipeline = build_pipeline(&settings, load_store(transactions)?)?;

    let template = pipeline.prompts().template();
    match &template.override_path {
        Some(path) => eprintln!("# prompt override: {}", path.display()),
        None => eprintln!(
            "# prompt: {} v{} (built-in)",
            template.metadata.id, template.metadata.version
        ),
    }

    println!("{}", pipeline.prompt_for(&InsightRequest::default()));
    Ok(())
}

pub async fn cmd_insights(
    config: Option<&Path>,
    transactions: Option<&Path>,
    format: InsightFormat,
) -> Result<()> {
    let settings = load_settings(config)?;
    let pipeline = build_pipeline(&settings, load_store(transactions)?)?;

    let response = pipeline.respond(&InsightRequest::default()).await;

    if format == InsightFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.is_success() {
            bail!("Insight request failed");
        }
        return Ok(());
    }

    match response {
        InsightResponse::Success { insights } => {
            if insights.is_empty() {
                println!("No insights returned.");
                return Ok(());
            }
            println!();
            println!("💡 Savings Insights");
            println!();
            print!("{}", render_insights(&insights, format));
            Ok(())
        }
        InsightResponse::Failure { error, debug } => {
            if let Some(debug) = debug {
                if let Some(status) = debug.status {
                    eprintln!("   status: {}", status);
                }
                if let Some(message) = debug.message {
                    eprintln!("   message: {}", message);
                }
            }
            bail!(error)
        }
    }
}

/// One bullet per insight, newline-terminated
pub fn render_insights(insights: &[String], format: InsightFormat) -> String {
    match format {
        InsightFormat::Html => {
            let items: String = insights
                .iter()
                .map(|i| format!("  <li>{}</li>\n", emphasis_to_html(i)))
                .collect();
            format!("<ul>\n{}</ul>\n", items)
        }
        _ => insights.iter().map(|i| format!("   • {}\n", i)).collect(),
    }
}
