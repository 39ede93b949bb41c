//! pkgd - single-activity package installation manager
//!
//! Loads the configuration, runs one install or repository sync through the
//! packager and reports the outcome.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod observer;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{ActivityReport, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::observer::{Completion, CompletionObserver};
use clap::Parser;
use pkgd_config::PackagerConfig;
use pkgd_core::{InstallationHandle, Packager};
use pkgd_errors::codes;
use pkgd_events::EventReceiver;
use pkgd_toolchain::OpkgToolchain;
use std::process;
use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting pkgd v{}", env!("CARGO_PKG_VERSION"));

    // File config (or defaults), then environment, then CLI flags.
    let mut config = PackagerConfig::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let renderer = OutputRenderer::new(cli.global.json);
    if let Commands::RenderConfig = cli.command {
        renderer.render_config(&config.render_toolchain_config())?;
        return Ok(());
    }

    let (event_sender, event_receiver) = pkgd_events::channel();
    let packager = Arc::new(Packager::new(OpkgToolchain::new())?.with_events(event_sender));

    let (completion_tx, completion_rx) = tokio::sync::mpsc::unbounded_channel();
    packager.register(Arc::new(CompletionObserver::new(completion_tx)))?;

    // Configuring runs the toolchain once; keep it off the async workers.
    let configuring = Arc::clone(&packager);
    tokio::task::spawn_blocking(move || configuring.configure(config))
        .await
        .map_err(|e| pkgd_errors::Error::internal(e.to_string()))??;

    let command_name = cli.command.name();
    let handle = match cli.command {
        Commands::Install {
            name,
            version,
            arch,
            download_only,
            ..
        } => Some(packager.install(
            name,
            version.unwrap_or_default(),
            arch.unwrap_or_default(),
            download_only,
        )?),
        Commands::Sync => {
            packager.synchronize_repository()?;
            None
        }
        Commands::RenderConfig => None,
    };

    let mut event_handler = EventHandler::new(cli.global.json);
    let completion = wait_for_completion(
        completion_rx,
        event_receiver,
        &mut event_handler,
        handle.as_ref(),
    )
    .await;

    let shutting_down = Arc::clone(&packager);
    tokio::task::spawn_blocking(move || shutting_down.shutdown())
        .await
        .map_err(|e| pkgd_errors::Error::internal(e.to_string()))?;

    let report = build_report(command_name, handle.as_ref(), completion?);
    renderer.render_report(&report)?;

    if report.succeeded() {
        info!("Command completed successfully");
        Ok(())
    } else {
        Err(CliError::ActivityFailed {
            activity: command_name.to_string(),
            code: report.status,
            message: None,
        })
    }
}

/// Pump events until the observer reports the terminal notification
///
/// Ctrl-C requests an abort of the running installation.
async fn wait_for_completion(
    mut completion_rx: UnboundedReceiver<Completion>,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    handle: Option<&InstallationHandle>,
) -> Result<Completion, CliError> {
    let mut abort_requested = false;
    loop {
        select! {
            completion = completion_rx.recv() => {
                // Drain any remaining events
                while let Ok(message) = event_receiver.try_recv() {
                    event_handler.handle_event(&message);
                }
                return completion.ok_or(CliError::Interrupted);
            }

            message = event_receiver.recv() => {
                if let Some(message) = message {
                    event_handler.handle_event(&message);
                }
            }

            _ = tokio::signal::ctrl_c(), if !abort_requested => {
                abort_requested = true;
                match handle {
                    Some(handle) => match handle.abort() {
                        Ok(()) => warn!(package = %handle.package(), "abort requested"),
                        Err(e) => warn!(error = %e, "abort not possible"),
                    },
                    None => warn!("repository sync cannot be aborted, waiting for it"),
                }
            }
        }
    }
}

fn build_report(
    command: &'static str,
    handle: Option<&InstallationHandle>,
    completion: Completion,
) -> ActivityReport {
    let (state, progress, status) = match completion {
        Completion::Installation {
            state,
            progress,
            error_code,
        } => (state.to_string(), Some(progress), error_code),
        Completion::Synced { status } => {
            let state = if status == codes::NONE {
                "synced"
            } else {
                "failed"
            };
            (state.to_string(), None, status)
        }
    };
    ActivityReport {
        command,
        package: handle.map(|h| h.package().to_string()),
        state,
        progress,
        status,
        status_name: codes::name(status),
        finished_at: chrono::Utc::now(),
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut PackagerConfig, global: &GlobalArgs, command: &Commands) {
    if let Some(verbosity) = global.verbosity {
        config.verbosity = verbosity;
    }
    if global.no_signature_check {
        config.no_signature_check = true;
    }
    if let Commands::Install {
        no_deps,
        update_first,
        ..
    } = command
    {
        config.no_deps |= *no_deps;
        config.always_update_first |= *update_first;
    }
}

/// Initialize tracing/logging
///
/// Logs go to stderr so stdout stays reserved for the command result.
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "debug"
    } else if json_mode {
        "off"
    } else {
        "warn,pkgd=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(debug_enabled)
            .with_env_filter(filter)
            .init();
    }
}
