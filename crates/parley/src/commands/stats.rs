//! Stats command - memory statistics.

use anyhow::Result;
use console::{Style, style};

use super::Context;

/// Run the stats command.
pub fn run(ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let stats = store.stats();

    if ctx.json_output {
        return ctx.print_json(&stats);
    }

    let dim = Style::new().dim();
    println!("{}", style("Memory Statistics").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!();
    println!("  Turns:           {} / {}", stats.total_turns, stats.capacity);
    println!("  Topics:          {}", stats.unique_topics);
    println!("  Avg confidence:  {:.0}%", stats.avg_confidence * 100.0);
    println!("  Context usage:   {:.0}%", stats.context_usage_ratio * 100.0);
    println!("  Avg processing:  {:.1} ms", stats.avg_processing_time_ms);
    println!(
        "  Last 24h / 7d:   {} / {}",
        stats.recent_activity.last_24h, stats.recent_activity.last_week
    );
    println!("  Lifetime turns:  {}", stats.profile.total_turns);
    if let Some(topic) = stats.profile.favorite_topic() {
        println!("  Favorite topic:  {}", topic);
    }

    if !stats.topic_distribution.is_empty() {
        println!();
        println!("{}", style("Topics").bold());
        for (topic, count) in &stats.topic_distribution {
            println!("  {:<14} {}", topic, count);
        }
    }

    if !stats.top_keywords.is_empty() {
        println!();
        println!("{}", style("Top keywords").bold());
        let keywords: Vec<String> = stats
            .top_keywords
            .iter()
            .map(|(k, n)| format!("{k} ({n})"))
            .collect();
        println!("  {}", keywords.join(", "));
    }

    Ok(())
}
