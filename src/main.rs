use std::process::ExitCode;

use autoprune::cli::Cli;
use autoprune::config::Config;
use autoprune::logging;
use autoprune::scheduler::Scheduler;
use clap::Parser;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("Cannot initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(&cli.config)?;
    let scheduler = Scheduler::new(config)?.dry_run(cli.dry_run);
    if cli.dry_run {
        info!("Dry run: nothing will be deleted");
    }

    if cli.once {
        tokio::task::spawn_blocking(move || scheduler.run_once()).await?;
        return Ok(());
    }

    let stopper = scheduler.stop_handle();
    let mut worker = tokio::task::spawn_blocking(move || scheduler.run());

    tokio::select! {
        res = &mut worker => {
            res?;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("Shutdown requested, stopping...");
            stopper.stop();
        }
    }

    worker.await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
