use clap::Parser;
use event_fund::args::{Args, Command};
use event_fund::error::{ErrorType, IntoResult};
use event_fund::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fund_home().path();

    // When FUND_IN_TEST_MODE is set and non-empty the in-memory store is used instead of the
    // hosted one, so the whole program can be exercised offline.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_key(), init_args.store_url())
            .await?
            .print(),

        Command::Shell => {
            let config = Config::load(home).await.pub_result(ErrorType::Config)?;
            commands::shell(&config, mode).await?.print()
        }

        command => {
            let config = Config::load(home).await.pub_result(ErrorType::Config)?;
            commands::run(&config, mode, command).await?
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only the library and this binary log, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
