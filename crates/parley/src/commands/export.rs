//! Export command - dump remembered conversations as JSON.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the export command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the export command.
pub fn run(args: ExportArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let document = store.export();
    let json = serde_json::to_string_pretty(&document)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            let green = Style::new().green();
            eprintln!(
                "{} Exported {} conversations to {}",
                green.apply_to("✓"),
                document.export_info.total_conversations,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
