mod cli;
mod font;
mod keys;
mod logging;
mod stdio_view;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use termlink_bridge::{Bridge, BridgeOptions, LocalTransport, TerminalView};
use termlink_common::{Geometry, SessionState, TermlinkError};
use termlink_config::schema::TermlinkConfig;
use termlink_config::SettingsStore;
use tokio::sync::mpsc;

use crate::cli::{Args, Command, FontCommand};
use crate::font::{FontAction, FontControl};
use crate::stdio_view::{RawModeGuard, StdioView};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Logging depends on the config, so load first and report failures after
    let (config, config_error) = match termlink_config::load_config(args.config.as_deref().map(Path::new)) {
        Ok(config) => (config, None),
        Err(e) => (TermlinkConfig::default(), Some(e)),
    };

    let interactive = args.command.is_none();
    let filter = logging::filter(args.log_level.as_deref(), config.logging.level);
    let log_path = logging::init(filter, config.logging.file_logging && interactive);

    tracing::info!("termlink v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &log_path {
        tracing::debug!(path = %path.display(), "logging to file");
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let config = apply_overrides(config, &args);
    let result = match args.command {
        Some(Command::Font { action }) => run_font_command(action),
        None => run_session(config).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("termlink: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Fold CLI flags into the loaded config.
fn apply_overrides(mut config: TermlinkConfig, args: &Args) -> TermlinkConfig {
    if let Some(command) = &args.execute {
        let flag = if cfg!(windows) { "-Command" } else { "-c" };
        config.shell.args = vec![flag.to_string(), command.clone()];
        config.shell.login_shell = false;
    }
    if let Some(dir) = &args.directory {
        config.shell.working_directory = Some(dir.clone());
    }
    if let (Some(rows), Some(cols)) = (args.rows, args.cols) {
        config.terminal.rows = rows;
        config.terminal.cols = cols;
    }
    config
}

fn run_font_command(command: FontCommand) -> Result<ExitCode, TermlinkError> {
    let mut font = FontControl::load(SettingsStore::open_default()?);
    let action = match command {
        FontCommand::Increase => Some(FontAction::Increase),
        FontCommand::Decrease => Some(FontAction::Decrease),
        FontCommand::Reset => Some(FontAction::Reset),
        FontCommand::Show => None,
    };

    if let Some(action) = action {
        font.apply(action)?;
    }
    println!("font size: {}", font.size());
    if action.is_none() {
        for action in [FontAction::Increase, FontAction::Decrease, FontAction::Reset] {
            println!("  {}", action.label());
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_session(config: TermlinkConfig) -> Result<ExitCode, TermlinkError> {
    let fallback = Geometry::new(config.terminal.rows, config.terminal.cols)
        .ok_or_else(|| TermlinkError::Other("terminal rows and cols must be non-zero".into()))?;
    let mut font = FontControl::load(SettingsStore::open_default()?);

    let mut raw = RawModeGuard::enter()?;
    let view = Arc::new(StdioView::new(fallback));
    view.set_font_size(font.size());

    let (font_tx, mut font_rx) = mpsc::unbounded_channel();
    view.start_input(font_tx)?;

    let transport = Arc::new(LocalTransport::from_config(&config));
    let bridge = Bridge::new(transport, Arc::clone(&view))
        .with_options(BridgeOptions::from(&config))
        .start()
        .await;

    let font_view = Arc::clone(&view);
    let font_task = tokio::spawn(async move {
        while let Some(action) = font_rx.recv().await {
            match font.apply(action) {
                Ok(true) => font_view.set_font_size(font.size()),
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, "failed to save font size"),
            }
        }
    });

    tokio::select! {
        state = bridge.wait_until_finished() => {
            tracing::info!(%state, "session finished");
        }
        _ = shutdown_signal() => {
            tracing::info!("termination signal received");
        }
    }

    let report = bridge.shutdown().await;
    view.stop_input();
    font_task.abort();
    raw.restore();

    tracing::info!(
        chunks = report.pump.chunks_fed,
        bytes_out = report.pump.bytes_fed,
        inputs = report.forwarder.written,
        "Shutdown complete"
    );
    if let SessionState::Failed(reason) = &report.final_state {
        eprintln!("termlink: {reason}");
    }
    Ok(ExitCode::from(exit_status(&report.final_state)))
}

/// Process exit status for a finished session: the shell's own code when
/// known, 1 on failure.
fn exit_status(state: &SessionState) -> u8 {
    match state {
        SessionState::Terminated(Some(code)) => (*code).min(255) as u8,
        SessionState::Failed(_) => 1,
        _ => 0,
    }
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
                tracing::warn!("cannot listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn execute_replaces_shell_args() {
        let args = Args::try_parse_from(["termlink", "-e", "top -b"]).unwrap();
        let mut config = TermlinkConfig::default();
        config.shell.login_shell = true;

        let config = apply_overrides(config, &args);
        assert_eq!(config.shell.args.last().map(String::as_str), Some("top -b"));
        assert!(!config.shell.login_shell);
    }

    #[test]
    fn directory_and_size_overrides() {
        let args =
            Args::try_parse_from(["termlink", "-d", "/srv", "--rows", "50", "--cols", "132"]).unwrap();
        let config = apply_overrides(TermlinkConfig::default(), &args);

        assert_eq!(config.shell.working_directory.as_deref(), Some("/srv"));
        assert_eq!((config.terminal.rows, config.terminal.cols), (50, 132));
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let args = Args::try_parse_from(["termlink"]).unwrap();
        let config = apply_overrides(TermlinkConfig::default(), &args);
        assert!(config.shell.args.is_empty());
        assert_eq!(config.terminal.rows, 24);
    }

    #[test]
    fn exit_codes_follow_final_state() {
        assert_eq!(exit_status(&SessionState::Terminated(Some(0))), 0);
        assert_eq!(exit_status(&SessionState::Terminated(Some(3))), 3);
        assert_eq!(exit_status(&SessionState::Terminated(Some(300))), 255);
        assert_eq!(exit_status(&SessionState::Terminated(None)), 0);
        assert_eq!(exit_status(&SessionState::Failed("permission denied".into())), 1);
    }
}
