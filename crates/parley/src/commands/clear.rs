//! Clear command - forget every conversation.

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use serde_json::json;

use super::Context;

/// Arguments for the clear command.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the clear command.
pub fn run(args: ClearArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let forgotten = store.len();

    if !args.yes {
        if !console::Term::stderr().is_term() {
            bail!("Refusing to clear memory without confirmation (pass --yes)");
        }
        if !confirm(&format!("Forget {forgotten} conversations?"))? {
            eprintln!("Cancelled");
            return Ok(());
        }
    }

    store.clear()?;

    if ctx.json_output {
        ctx.print_json(&json!({ "cleared": forgotten }))
    } else {
        let green = Style::new().green();
        println!("{} Forgot {} conversations", green.apply_to("✓"), forgotten);
        Ok(())
    }
}

/// Ask a yes/no question on the terminal.
fn confirm(question: &str) -> Result<bool> {
    let term = console::Term::stderr();
    term.write_str(&format!("{question} [y/N] "))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
