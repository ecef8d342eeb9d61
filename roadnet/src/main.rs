//! `roadnet` - road-network rule-state tooling

use clap::Parser;
use tokio_util::sync::CancellationToken;

use roadnet::cli::args::Cli;
use roadnet::cli::commands;
use roadnet::error::ExitCode;
use roadnet::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_settings());

    let cancel = CancellationToken::new();

    // First signal asks running commands to stop; a second one exits.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        let terminated = wait_for_signal().await;
        signal_cancel.cancel();
        tracing::info!("shutting down (press Ctrl+C again to force)");

        let _ = wait_for_signal().await;
        std::process::exit(if terminated {
            ExitCode::TERMINATED
        } else {
            ExitCode::INTERRUPTED
        });
    });

    let result = commands::dispatch(cli, cancel.clone()).await;

    match result {
        Ok(()) if cancel.is_cancelled() => std::process::exit(ExitCode::INTERRUPTED),
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM. Returns `true` for SIGTERM.
async fn wait_for_signal() -> bool {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => false,
                _ = sigterm.recv() => true,
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                false
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        false
    }
}
