use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "boot-inventory", version)]
#[command(about = "Inventory the beans of a Spring Boot project and render a report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Parser threads (defaults to one per core).
    #[arg(long, value_name = "N", global = true)]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyze a project directory and write a report.
    Analyze {
        #[arg(value_name = "PROJECT")]
        project_path: PathBuf,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Html)]
        format: ReportFormat,
    },
    /// Serve `/analyze` over HTTP.
    Serve {
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Html,
    Json,
    Text,
}

const SUBCOMMANDS: [&str; 3] = ["analyze", "serve", "help"];

/// `boot-inventory ./shop` is shorthand for `boot-inventory analyze ./shop`.
pub fn rewrite_args_for_implicit_analyze(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--threads" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !SUBCOMMANDS.contains(&token) {
            args.insert(idx, "analyze".to_string());
        }
    }

    args
}

impl Cli {
    pub fn parse_with_implicit_analyze() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Cli::parse_from(rewrite_args_for_implicit_analyze(args))
    }
}
