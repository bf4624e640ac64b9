use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use md2gdoc::{Config, ConvertError, ConvertOptions, GoogleDocsClient, RecordingService};

const DEFAULT_CONFIG_FILE: &str = "md2gdoc.toml";

#[derive(Parser)]
#[command(name = "md2gdoc")]
#[command(about = "Convert Markdown meeting notes into a formatted Google Doc")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Config file (defaults to md2gdoc.toml in the current directory, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document title (defaults to the first `#` heading)
    #[arg(short, long)]
    title: Option<String>,

    /// OAuth access token with the documents scope
    #[arg(long, env = "GOOGLE_DOCS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print the requests that would be sent instead of calling the API
    #[arg(long)]
    dry_run: bool,

    /// Columns of indentation per list level
    #[arg(long)]
    indent_unit: Option<usize>,

    /// Turn **bold** and *italic* markup into styled text
    #[arg(long)]
    inline_markup: bool,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let result = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
    };
    match result {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    // Read input file
    let markdown = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let mut config = load_config(&cli);
    if let Some(indent_unit) = cli.indent_unit {
        config.parse.indent_unit = indent_unit;
    }
    if cli.inline_markup {
        config.parse.inline_markup = true;
    }

    let mut options = match ConvertOptions::from_config(&config) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    options.title = cli.title.clone();

    if cli.dry_run {
        let mut service = RecordingService::new(config.docs_options());
        if let Err(e) = md2gdoc::convert(&markdown, &mut service, &options) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        match serde_json::to_string_pretty(&service.batches) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding requests: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(token) = cli.token.clone() else {
        eprintln!("Error: no access token, pass --token or set GOOGLE_DOCS_TOKEN");
        std::process::exit(1);
    };

    let mut client = GoogleDocsClient::with_api_base(token, config.service.api_base.clone())
        .with_options(config.docs_options());

    match md2gdoc::convert(&markdown, &mut client, &options) {
        Ok(converted) => {
            println!("Created \"{}\"", converted.title);
            println!("{}", converted.url);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let ConvertError::Styling { url, .. } = &e {
                eprintln!("The text is in {} but formatting is incomplete.", url);
            }
            std::process::exit(1);
        }
    }
}
