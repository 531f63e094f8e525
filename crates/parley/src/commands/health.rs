//! Health command - memory store liveness.

use anyhow::Result;
use console::{Style, style};

use super::Context;

/// Run the health command.
pub fn run(ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let health = store.health();

    if ctx.json_output {
        return ctx.print_json(&health);
    }

    let dim = Style::new().dim();
    let green = Style::new().green();
    println!("Memory: {}", green.apply_to("● ok"));
    println!("  Turns:     {} / {}", health.turns, health.capacity);
    println!(
        "  Indexed:   {} topics, {} keywords",
        health.indexed_topics, health.indexed_keywords
    );
    match &health.snapshot_path {
        Some(path) if health.snapshot_exists => println!("  Snapshot:  {}", path),
        Some(path) => println!("  Snapshot:  {} {}", path, dim.apply_to("(not written yet)")),
        None => println!("  Snapshot:  {}", style("disabled").yellow()),
    }
    Ok(())
}
