use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::Level;

use vcd_parser::{ParseOptions, Trace, VcdParser};

#[derive(Parser)]
#[command(version, about = "Parse VCD files and summarize their contents")]
struct Cli {
    /// The paths of the files to read, `-` for standard input
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Drop time steps before this time
    #[arg(long, default_value_t = 0)]
    start_time: u64,

    /// Drop time steps after this time
    #[arg(long, default_value_t = u64::MAX)]
    end_time: u64,

    /// Log every token the scanner produces
    #[arg(long)]
    trace_scanning: bool,

    /// Log every action the parser takes
    #[arg(long)]
    trace_parsing: bool,

    /// Print the scope tree of each parsed file
    #[arg(long)]
    print_scopes: bool,
}

fn summarize(trace: &Trace) {
    let metadata = trace.metadata();
    let or_unknown = |text: Option<&str>| text.unwrap_or("unknown").to_string();

    println!("  version    : {}", or_unknown(metadata.version.as_ref().map(|v| v.0.as_str())));
    match metadata.parsed_date {
        Some(date) => println!("  date       : {date}"),
        None => println!("  date       : {}", or_unknown(metadata.date.as_deref())),
    }
    println!("  timescale  : {}", or_unknown(metadata.timescale.as_deref()));
    println!("  signals    : {}", trace.signals().len());
    println!("  time steps : {}", trace.time_steps().len());
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = if args.trace_scanning {
        Level::TRACE
    } else if args.trace_parsing {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut parser = VcdParser::with_options(ParseOptions {
        start_time: args.start_time,
        end_time: args.end_time,
        trace_scanning: args.trace_scanning,
        trace_parsing: args.trace_parsing,
    });

    let mut failed = false;
    for path in &args.paths {
        let now = Instant::now();
        match parser.parse_file(path) {
            Ok(trace) => {
                let elapsed = now.elapsed();
                println!("Parsed VCD file {} : {:.2?}", path.display(), elapsed);
                summarize(&trace);
                if args.print_scopes {
                    trace.print_scopes();
                }
            }
            // the session already reported the failure through its sink
            Err(_) => failed = true,
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
