//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use serde_json::json;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let resolved = ctx.loaded.config.resolved();

    if ctx.json_output {
        return ctx.print_json(&resolved);
    }

    print!("{}", resolved.to_toml()?);
    let dim = Style::new().dim();
    println!();
    println!(
        "{}",
        dim.apply_to(format!("# snapshot: {}", ctx.snapshot_path().display()))
    );
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    if ctx.json_output {
        return ctx.print_json(&json!({
            "sources": loaded.sources,
            "warnings": loaded.warnings,
        }));
    }

    let dim = Style::new().dim();
    let green = Style::new().green();
    println!("{}", style("Config sources (lowest precedence first)").bold());
    for source in &loaded.sources {
        let label = format!("{:<8}", source.layer);
        if source.loaded {
            println!(
                "  {} {} {}",
                green.apply_to("●"),
                label,
                source.path.display()
            );
        } else {
            println!(
                "  {} {} {}",
                dim.apply_to("○"),
                dim.apply_to(label),
                dim.apply_to(source.path.display())
            );
        }
    }
    for warning in &loaded.warnings {
        println!("  {} {}", Style::new().yellow().apply_to("!"), warning);
    }
    Ok(())
}
