//! History command - recent conversation turns.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use parley_memory::MAX_HISTORY_LIMIT;

use super::{Context, truncate};

/// Arguments for the history command.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show turns with this topic
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Number of turns to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Run the history command.
pub fn run(args: HistoryArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let page = store.history(args.topic.as_deref(), args.limit);

    if ctx.json_output {
        return ctx.print_json(&page);
    }

    let dim = Style::new().dim();
    if page.entries.is_empty() {
        println!("{}", dim.apply_to("No conversations found"));
        return Ok(());
    }

    println!("{}", style("Conversation History").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!();

    for entry in &page.entries {
        println!(
            "{} {} {}",
            dim.apply_to(entry.created_at.format("%Y-%m-%d %H:%M")),
            style(format!("[{}]", entry.topic)).cyan(),
            truncate(&entry.user_text, 70)
        );
        println!("   {}", dim.apply_to(truncate(&entry.response_preview, 70)));
        println!();
    }

    let mut footer = format!("{} of {} turns", page.entries.len(), page.total_count);
    if args.limit > MAX_HISTORY_LIMIT {
        footer.push_str(&format!(" (limit capped at {MAX_HISTORY_LIMIT})"));
    }
    println!("{}", dim.apply_to(footer));
    Ok(())
}
