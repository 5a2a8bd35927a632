//! Push runner CLI.

use pushr::{init_tracing, parse_args, run_file, USAGE};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --steps N    Step budget (default 0: run until done)");
        eprintln!("  --seed S     Seed for the random instructions");
        eprintln!("  --collect    Force a collection after the run");
        std::process::exit(1);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    match run_file(&options) {
        Ok(report) => {
            eprintln!("{} steps", report.steps);
            if let Some(stats) = report.collected {
                eprintln!(
                    "collected: {} freed, {} live, {} roots",
                    stats.freed, stats.live, stats.roots
                );
            }
            print!("{}", report.state);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
