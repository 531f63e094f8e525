//! Sort command - run the adaptive sorter on numbers.

use std::time::Instant;

use anyhow::Result;
use clap::Args;
use console::Style;
use parley_sort::{Algorithm, SortOptions, smart_sort};
use serde::Serialize;

use super::Context;

/// Arguments for the sort command.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Numbers to sort
    #[arg(required = true, allow_negative_numbers = true)]
    pub numbers: Vec<f64>,

    /// Sort in descending order
    #[arg(short, long)]
    pub desc: bool,

    /// Algorithm: auto, builtin, insertion, quicksort
    #[arg(short, long, default_value = "auto")]
    pub algorithm: Algorithm,
}

#[derive(Debug, Serialize)]
struct SortReport<'a> {
    input: &'a [f64],
    sorted: Vec<f64>,
    algorithm: Algorithm,
    descending: bool,
    elapsed_us: u128,
}

/// Run the sort command.
pub fn run(args: SortArgs, ctx: &Context) -> Result<()> {
    let options = SortOptions::new()
        .with_descending(args.desc)
        .with_algorithm(args.algorithm);

    let start = Instant::now();
    let sorted = smart_sort(&args.numbers, &options)?;
    let elapsed_us = start.elapsed().as_micros();

    if ctx.json_output {
        return ctx.print_json(&SortReport {
            input: &args.numbers,
            sorted: sorted.items,
            algorithm: sorted.algorithm,
            descending: args.desc,
            elapsed_us,
        });
    }

    let values: Vec<String> = sorted.items.iter().map(f64::to_string).collect();
    println!("{}", values.join(" "));
    if ctx.verbose {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to(format!("[{} · {} µs]", sorted.algorithm, elapsed_us))
        );
    }
    Ok(())
}
