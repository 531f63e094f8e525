//! Understand command - show the classifier's reading of a message.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use parley_nlu::{Analysis, Classifier, KeywordClassifier, Understanding};
use serde::Serialize;

use super::Context;

/// Arguments for the understand command.
#[derive(Args, Debug)]
pub struct UnderstandArgs {
    /// The message to analyze
    #[arg(required = true)]
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Report {
    analysis: Analysis,
    understanding: Understanding,
}

/// Run the understand command.
///
/// Recent topics come from the store, but nothing is recorded.
pub fn run(args: UnderstandArgs, ctx: &Context) -> Result<()> {
    let classifier = KeywordClassifier::new()?;
    let store = ctx.open_store();
    let recent: Vec<String> = store.recent(5).into_iter().map(|t| t.topic).collect();

    let report = Report {
        analysis: classifier.classify(&args.message),
        understanding: Understanding::analyze(&args.message, &recent),
    };

    if ctx.json_output {
        return ctx.print_json(&report);
    }

    let dim = Style::new().dim();
    let analysis = &report.analysis;
    let understanding = &report.understanding;
    let keywords: Vec<&str> = analysis.keywords.iter().map(String::as_str).collect();

    println!("{}", style("Classification").bold());
    println!("  Topic:        {}", analysis.topic);
    println!("  Intent:       {}", analysis.intent);
    println!("  Complexity:   {}", analysis.complexity);
    println!("  Keywords:     {}", keywords.join(", "));
    println!("  Importance:   {:.2}", analysis.importance);
    println!("  Confidence:   {:.2}", analysis.confidence);
    println!();
    println!("{}", style("Understanding").bold());
    println!("  Confidence:   {:.2}", understanding.confidence);
    match understanding.detected_intent {
        Some(kind) => println!("  Request:      {}", kind),
        None => println!("  Request:      {}", dim.apply_to("none")),
    }
    if !understanding.context.connections.is_empty() {
        println!(
            "  Refers to:    {}",
            understanding.context.connections.join(", ")
        );
    }
    println!("  Reading:      {}", understanding.interpretation);
    Ok(())
}
