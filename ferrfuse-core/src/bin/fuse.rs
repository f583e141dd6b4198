use std::error::Error;
use std::io::Write;

use clap::Parser;
use snafu::ResultExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ferrfuse_core::error::{JsonSnafu, WriteOutputSnafu};
use ferrfuse_core::{DocumentInput, FusionConfig, fuse_document};

#[derive(Parser)]
#[command(name = "fuse")]
#[command(about = "Fuse native document structure and layout detections into one page layout")]
struct Args {
    #[arg(help = "Input document evidence (JSON)")]
    input: String,

    #[arg(short, long, help = "Fusion config (JSON), defaults when omitted")]
    config: Option<String>,

    #[arg(short, long, help = "Output file, stdout when omitted")]
    output: Option<String>,

    #[arg(long, help = "Number of page workers")]
    workers: Option<usize>,

    #[arg(long, help = "Pretty-print the output JSON")]
    pretty: bool,

    #[arg(long, help = "Log as JSON lines")]
    json_log: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.json_log);

    info!("Input: {}", args.input);
    let mut config = match &args.config {
        Some(path) => {
            info!("Config: {}", path);
            FusionConfig::from_json_file(path)?
        }
        None => FusionConfig::default(),
    };
    if args.workers.is_some() {
        config.workers = args.workers;
    }

    let input = DocumentInput::from_json_file(&args.input)?;
    let document = fuse_document(&input, &config)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .context(JsonSnafu { stage: "output" })?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).context(WriteOutputSnafu { path: path.clone() })?;
            info!("Wrote {} pages to {}", document.pages.len(), path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context(WriteOutputSnafu { path: "<stdout>" })?;
        }
    }

    Ok(())
}
