//! bibresolve CLI: authorship resolution over bibliographic indexes.
//!
//! Usage:
//!   bibresolve resolve [--config path] [--request file|-]
//!   bibresolve ask --subject S --predicate P --object O [--config path]
//!   bibresolve cache purge [--config path]
//!   bibresolve mcp [--config path]

use bibresolve::{Config, Request, Response, Tree};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "bibresolve",
    version,
    about = "Resolve authorship questions against HAL-style bibliographic indexes"
)]
struct Cli {
    /// Configuration file (JSON, or YAML for .yaml/.yml); defaults to $BIBRESOLVE_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a request envelope and print the responses as JSON
    Resolve {
        /// Request file, or '-' for stdin
        #[arg(long, default_value = "-")]
        request: String,
    },
    /// Answer a single triple given on the command line ('?' marks the unknown)
    Ask {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        predicate: String,
        #[arg(long)]
        object: String,
        /// Language of the question
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Manage the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Start the MCP (Model Context Protocol) server on stdio
    Mcp,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete expired entries
    Purge,
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    Config::resolve(path).map_err(|e| format!("Failed to load configuration: {}", e))
}

fn read_request(source: &str) -> Result<Request, String> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| format!("cannot read '{}': {}", source, e))?
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid request: {}", e))
}

/// `?` is the unknown; anything else is a literal resource
fn term(arg: &str) -> Tree {
    if arg == "?" {
        Tree::Missing
    } else {
        Tree::resource(arg)
    }
}

fn answer(config: &Config, request: Request) -> Result<Vec<Response>, String> {
    let resolver = config
        .build_resolver()
        .map_err(|e| format!("Failed to set up resolver: {}", e))?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {}", e))?;
    Ok(rt.block_on(resolver.answer(&request)))
}

fn print_responses(responses: &[Response]) -> i32 {
    match serde_json::to_string_pretty(responses) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_resolve(config: &Config, source: &str) -> i32 {
    let request = match read_request(source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match answer(config, request) {
        Ok(responses) => print_responses(&responses),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_ask(config: &Config, subject: &str, predicate: &str, object: &str, language: &str) -> i32 {
    let tree = Tree::triple(term(subject), term(predicate), term(object));
    let request = Request::new(uuid::Uuid::new_v4().to_string(), language, tree);
    match answer(config, request) {
        Ok(responses) if responses.is_empty() => {
            eprintln!("No answer.");
            0
        }
        Ok(responses) => print_responses(&responses),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_cache_purge(config: &Config) -> i32 {
    match config.cache.purge_expired() {
        Ok(removed) => {
            println!("Purged {} expired entries", removed);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Resolve { request } => cmd_resolve(&config, &request),
        Commands::Ask {
            subject,
            predicate,
            object,
            language,
        } => cmd_ask(&config, &subject, &predicate, &object, &language),
        Commands::Cache {
            action: CacheAction::Purge,
        } => cmd_cache_purge(&config),
        Commands::Mcp => bibresolve::mcp::run_mcp_server(config),
    };
    std::process::exit(code);
}
