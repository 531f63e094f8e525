//! Ask command - one message, one reply.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;
use crate::responder::{Exchange, Responder};

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The message to send
    #[arg(required = true)]
    pub message: String,
}

/// Run the ask command.
pub fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let responder = Responder::new(ctx.open_store())?;
    let result = responder.respond(&args.message);
    responder.store().shutdown();
    let exchange = result?;

    if ctx.json_output {
        ctx.print_json(&exchange)
    } else {
        print_exchange(&exchange, ctx.verbose);
        Ok(())
    }
}

/// Print a reply followed by a dim metadata line.
pub fn print_exchange(exchange: &Exchange, verbose: bool) {
    let dim = Style::new().dim();
    println!("{}", exchange.response);
    println!();

    let mut meta = format!(
        "[{} · {} · {:.0}% confidence",
        exchange.topic,
        exchange.intent,
        exchange.confidence * 100.0
    );
    if exchange.context_count > 0 {
        meta.push_str(&format!(" · {} related", exchange.context_count));
    }
    meta.push(']');
    println!("{}", dim.apply_to(meta));

    if verbose {
        let keywords: Vec<&str> = exchange.keywords.iter().map(String::as_str).collect();
        println!(
            "{}",
            dim.apply_to(format!(
                "keywords: {} | importance: {:.2} | {} ms | id: {}",
                keywords.join(", "),
                exchange.importance,
                exchange.processing_time_ms,
                exchange.turn_id
            ))
        );
    }
}
