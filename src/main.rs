use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use escalog::{
    CaptureClient, ColorChoice, Dsn, OutputMode, PipelineConfig, SinkOptions, TransformPipeline,
};

#[derive(Parser)]
#[command(name = "escalog")]
#[command(about = "Format structured log streams and escalate severe records")]
#[command(version = "0.1.0")]
struct Args {
    /// Output format: "json" keeps records as JSON, anything else pretty-prints
    #[arg(long = "log-format", value_name = "FORMAT")]
    log_format: Option<String>,

    /// Replace the numeric level with its name in JSON output
    #[arg(long = "level-in-string")]
    level_in_string: bool,

    /// DSN of the error-tracking service; enables escalation of severe records
    #[arg(long = "sentry-dsn", value_name = "DSN")]
    sentry_dsn: Option<String>,

    /// Color pretty output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Input file (default: stdin)
    #[arg(short = 'i', long = "input")]
    input_file: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Maximum line length
    #[arg(long, default_value = "1048576")] // 1MB
    max_line_length: usize,

    /// Buffer size for I/O
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,

    /// Debug mode - show processing details
    #[arg(long)]
    debug: bool,
}

impl Args {
    // flags win; the process environment fills the gaps, the way the
    // original transport was configured
    fn log_format(&self) -> Option<String> {
        self.log_format
            .clone()
            .or_else(|| std::env::var("LOG_FORMAT").ok())
    }

    fn level_in_string(&self) -> bool {
        self.level_in_string
            || std::env::var("LOG_LEVEL_IN_STRING").is_ok_and(|value| is_truthy(&value))
    }

    fn sentry_dsn(&self) -> Option<String> {
        self.sentry_dsn
            .clone()
            .or_else(|| std::env::var("SENTRY_DSN").ok())
            .filter(|dsn| !dsn.is_empty())
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mode = OutputMode::resolve(args.log_format().as_deref(), args.level_in_string());

    let config = PipelineConfig {
        mode,
        color: args.color.enabled(),
        buffer_size: args.buffer_size,
        max_line_length: args.max_line_length,
        debug: args.debug,
    };

    let mut pipeline = match args.sentry_dsn() {
        Some(raw) => {
            let dsn: Dsn = raw
                .parse()
                .with_context(|| format!("invalid reporting DSN '{}'", raw))?;
            let sink = CaptureClient::stderr(SinkOptions::new(dsn));
            TransformPipeline::with_sink(config, Arc::new(sink))
        }
        None => TransformPipeline::new(config),
    };

    let input: Box<dyn BufRead> = if let Some(input_path) = &args.input_file {
        let file = File::open(input_path)
            .with_context(|| format!("failed to open input file '{}'", input_path.display()))?;
        Box::new(BufReader::with_capacity(args.buffer_size, file))
    } else {
        Box::new(BufReader::with_capacity(args.buffer_size, io::stdin()))
    };

    let mut output: Box<dyn Write> = if let Some(output_path) = &args.output_file {
        let file = File::create(output_path)
            .with_context(|| format!("failed to create output file '{}'", output_path.display()))?;
        Box::new(io::BufWriter::with_capacity(args.buffer_size, file))
    } else {
        Box::new(io::BufWriter::with_capacity(args.buffer_size, io::stdout()))
    };

    let stats = pipeline
        .process_stream(input, &mut output)
        .context("processing failed")?;

    output.flush()?;

    if args.debug {
        eprintln!("Final statistics:");
        eprintln!("  Records processed: {}", stats.records_processed);
        eprintln!("  Records output: {}", stats.records_output);
        eprintln!("  Records suppressed: {}", stats.records_suppressed);
        eprintln!("  Records escalated: {}", stats.records_escalated);
        eprintln!("  Sink failures: {}", stats.sink_failures);
        eprintln!("  Processing time: {:?}", stats.processing_time);
    }

    Ok(())
}
