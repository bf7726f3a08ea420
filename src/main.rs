use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use btreedb::repl;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "btreedb", version = VERSION, about = "Tiny single-table B+ tree database.")]
struct Cli {
    /// Path to the database file. Created if it does not already exist.
    db_path: PathBuf,

    /// Append structured logs to this file instead of stderr.
    #[arg(long, env = "BTREEDB_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref());

    match repl::start(&cli.db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_file: Option<&std::path::Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .expect("failed to open log file");
            subscriber.with_writer(file).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }
}
