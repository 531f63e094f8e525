//! Chat command - interactive REPL mode.

use anyhow::Result;
use clap::Args;

use super::Context;
use super::repl::Repl;
use crate::responder::Responder;

/// Arguments for the chat command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Forget earlier conversations before starting
    #[arg(long)]
    pub fresh: bool,
}

/// Run the chat command (REPL).
pub fn run(args: ChatArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    if args.fresh {
        store.clear()?;
    }

    let responder = Responder::new(store)?;
    let mut repl = Repl::new(responder, ctx.verbose)?;
    let result = repl.run();
    repl.responder().store().shutdown();
    result
}
