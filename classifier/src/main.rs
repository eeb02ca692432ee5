//! granite-classifier CLI
//!
//! Trains a Naive Bayes classifier from the files named in a TOML config and
//! either reports on the training set, evaluates against a held-out test set,
//! or classifies ad-hoc text.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use granite_classifier::{load_training_text, ClassifierConfig, NaiveBayesClassifier};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "granite-classifier")]
#[command(about = "Naive Bayes text classifier", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on `training-set` and report label and word counts
    Train,

    /// Train on `training-set`, classify every row of `test-set` and report
    /// precision and recall against the expected labels
    Evaluate {
        /// Number of top-ranked labels taken as the prediction
        #[arg(long, default_value = "1")]
        top: usize,
    },

    /// Print scores for ad-hoc text
    Classify {
        /// Text to classify
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ClassifierConfig::load_toml(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let classifier = train(&config)?;

    match cli.command {
        Commands::Train => report_training_set(&classifier),
        Commands::Evaluate { top } => {
            let Some(test_set) = &config.classifier.test_set else {
                bail!("classifier.test-set is not configured");
            };
            evaluate(&classifier, test_set, top)?;
        }
        Commands::Classify { text } => {
            let text = text.join(" ");
            for score in classifier.classify(&text) {
                let words: Vec<&str> = score.contributors.iter().map(|c| c.key.as_str()).collect();
                println!("{}\t{:.6}\t{}", score.label, score.score, words.join(" "));
            }
        }
    }
    Ok(())
}

fn train(config: &ClassifierConfig) -> Result<NaiveBayesClassifier> {
    let Some(training_set) = &config.classifier.training_set else {
        bail!("classifier.training-set is not configured");
    };
    let texts = load_training_text(training_set)
        .with_context(|| format!("loading training set {}", training_set.display()))?;
    Ok(config.train(&texts)?)
}

fn report_training_set(classifier: &NaiveBayesClassifier) {
    let set = classifier.training_set();
    println!(
        "rows: {} (skipped {})",
        set.training_set_size(),
        set.skipped_rows().len()
    );
    println!("words: {}", set.word_total_counts().len());
    println!("training stop words: {}", set.training_stop_words().len());
    for (label, rows) in set.classification_line_counts() {
        let words = set
            .classification_word_counts()
            .get(label)
            .map_or(0, |w| w.len());
        println!(
            "{label}\trows {rows}\twords {words}\tprior {:.4}",
            classifier.prior(label)
        );
    }
}

fn evaluate(classifier: &NaiveBayesClassifier, test_set: &Path, top: usize) -> Result<()> {
    let texts = load_training_text(test_set)
        .with_context(|| format!("loading test set {}", test_set.display()))?;

    let mut true_positives = 0usize;
    let mut predicted_total = 0usize;
    let mut expected_total = 0usize;
    for (line, text) in &texts {
        let predicted: BTreeSet<String> = classifier
            .classify(&text.text)
            .into_iter()
            .take(top)
            .map(|s| s.label)
            .collect();
        let hits = predicted.intersection(&text.classifications).count();
        true_positives += hits;
        predicted_total += predicted.len();
        expected_total += text.classifications.len();

        let predicted: Vec<&str> = predicted.iter().map(String::as_str).collect();
        let expected: Vec<&str> = text.classifications.iter().map(String::as_str).collect();
        println!(
            "{line}\t{}\tpredicted [{}]\texpected [{}]",
            text.id,
            predicted.join(", "),
            expected.join(", ")
        );
    }

    let precision = ratio(true_positives, predicted_total);
    let recall = ratio(true_positives, expected_total);
    info!(rows = texts.len(), precision, recall, "evaluation finished");
    println!("precision {precision:.4}\trecall {recall:.4}");
    Ok(())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
