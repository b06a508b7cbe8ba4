//! Prognosis - Main Entry Point
//!
//! Trains the selected classifier on the configured symptom dataset, then
//! reloads the persisted model and scores the held-out test data.

use clap::Parser;
use colored::*;
use std::path::PathBuf;

use prognosis::config::AppConfig;
use prognosis::predictor::{DiseasePredictor, ModelKind};

#[derive(Parser)]
#[command(name = "prognosis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Symptom-based disease prediction")]
struct Cli {
    /// Classifier to train (mnb, decision_tree, random_forest, gradient_boost)
    #[arg(short, long, default_value = "decision_tree")]
    model: String,

    /// Pipeline configuration file
    #[arg(short, long, default_value = "./config.yaml")]
    config: PathBuf,
}

fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", "─".repeat(48).truecolor(100, 100, 100));
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prognosis=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some(config) = AppConfig::load(&cli.config) else {
        println!("Config not loaded successfully. Check your config file and paths.");
        return Ok(());
    };

    let kind = ModelKind::from_name(&cli.model)?;

    let predictor = DiseasePredictor::new(config)?;
    let training = predictor.train(kind)?;

    section("Validation");
    println!("  {:<16} {}", muted("Model"), kind.name().white());
    println!(
        "  {:<16} {}",
        muted("Accuracy"),
        format!("{:.4}", training.accuracy).white().bold()
    );
    println!(
        "  {:<16} {} ± {}",
        muted("CV (3-fold)"),
        format!("{:.4}", training.cross_validation.mean_score).white(),
        format!("{:.4}", training.cross_validation.std_score)
    );
    println!(
        "  {:<16} {}",
        muted("Saved to"),
        training.model_path.display()
    );

    section("Test");
    match predictor.predict(kind.name(), None)? {
        Some(evaluation) => {
            println!(
                "  {:<16} {}",
                muted("Accuracy"),
                format!("{:.4}", evaluation.accuracy).white().bold()
            );
            println!();
            println!("{}", evaluation.report);
        }
        None => {
            println!("  {}", "no result (saved model unavailable)".yellow());
            println!();
        }
    }

    Ok(())
}
