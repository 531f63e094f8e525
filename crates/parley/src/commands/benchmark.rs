//! Benchmark command - time the sort algorithms.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use parley_sort::benchmark;

use super::Context;

/// Arguments for the benchmark command.
#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    /// Input sizes, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "100,1000")]
    pub sizes: Vec<usize>,

    /// Trials per size
    #[arg(short, long, default_value = "3")]
    pub trials: usize,
}

/// Run the benchmark command.
pub fn run(args: BenchmarkArgs, ctx: &Context) -> Result<()> {
    if args.trials == 0 {
        bail!("--trials must be at least 1");
    }

    let report = benchmark(&args.sizes, args.trials);

    if ctx.json_output {
        return ctx.print_json(&report);
    }

    let dim = Style::new().dim();
    let red = Style::new().red();
    for size in &report.sizes {
        println!("{}", style(format!("{} elements", size.size)).bold());
        for timing in &size.timings {
            let check = if timing.verified {
                String::new()
            } else {
                format!(" {}", red.apply_to("(wrong result)"))
            };
            println!(
                "  {:>10}: {:>9.3} ms{}",
                timing.algorithm.as_str(),
                timing.avg_ms,
                check
            );
        }
    }
    println!("{}", dim.apply_to(format!("{} trials per size", report.trials)));
    Ok(())
}
