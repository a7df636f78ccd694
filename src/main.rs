use clap::{Parser as ClapParser, Subcommand};
use fname_lang::{
    Config,
    cli::{self, CheckResult, CliError, EvalOptions, Input},
};
use std::{
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "fname")]
#[command(about = "fname - A formula language for naming files")]
#[command(version)]
struct Cli {
    /// Log debug events (overrides FNAME_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a formula
    Check {
        /// The formula to validate
        formula: String,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a formula for files, or for JSON contexts piped to stdin
    Eval {
        /// The formula to evaluate
        formula: String,

        /// Files to name (reads JSON contexts from stdin if none)
        files: Vec<PathBuf>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// First counter value
        #[arg(long)]
        counter_start: Option<u64>,

        /// Counter increment between files
        #[arg(long)]
        counter_step: Option<u64>,

        /// Default zero-padding of {counter}
        #[arg(long)]
        counter_width: Option<usize>,

        /// Keep characters that are invalid in file names
        #[arg(long)]
        keep_invalid: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'fname docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FNAME_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { formula, config } => run_check(&formula, config),
        Commands::Eval {
            formula,
            files,
            config,
            counter_start,
            counter_step,
            counter_width,
            keep_invalid,
            json,
        } => load_config(config).and_then(|mut config| {
            if let Some(start) = counter_start {
                config.counter.start = start;
            }
            if let Some(step) = counter_step {
                config.counter.step = step;
            }
            if let Some(width) = counter_width {
                config.counter.width = width;
            }
            config.keep_invalid_characters |= keep_invalid;
            run_eval(formula, files, config, json)
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(true)
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
            true
        }),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config, CliError> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

fn run_check(formula: &str, config: Option<PathBuf>) -> Result<bool, CliError> {
    let config = load_config(config)?;
    match cli::execute_check(formula, config.max_depth) {
        CheckResult::Valid(_) => {
            println!("Formula is valid");
            Ok(true)
        }
        CheckResult::Invalid { error, display } => {
            eprintln!("Syntax error: {}", error.message());
            eprintln!("{}", display);
            Ok(false)
        }
    }
}

fn run_eval(formula: String, files: Vec<PathBuf>, config: Config, json: bool) -> Result<bool, CliError> {
    let input = if !files.is_empty() {
        Input::Files(files)
    } else if !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Input::Json(buffer)
    } else {
        return Err(CliError::NoInput);
    };

    let report = cli::execute_eval(&EvalOptions {
        formula,
        input,
        config,
    })?;

    if json {
        println!("{}", report.render_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(report.failed() == 0)
}
