use clap::{Parser, Subcommand, ValueEnum};

/// termlink: run your shell through a frame-paced terminal bridge.
#[derive(Parser, Debug)]
#[command(name = "termlink", version, about)]
pub struct Args {
    /// Execute a command instead of the default shell.
    #[arg(short = 'e', long)]
    pub execute: Option<String>,

    /// Working directory to start in.
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Rows to use when the host terminal size is unknown.
    #[arg(long, requires = "cols")]
    pub rows: Option<u16>,

    /// Columns to use when the host terminal size is unknown.
    #[arg(long, requires = "rows")]
    pub cols: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show or change the persisted font size.
    Font {
        #[arg(value_enum, default_value_t = FontCommand::Show)]
        action: FontCommand,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontCommand {
    Increase,
    Decrease,
    Reset,
    Show,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_a_session() {
        let args = Args::try_parse_from(["termlink"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.execute.is_none());
    }

    #[test]
    fn parses_shell_overrides() {
        let args = Args::try_parse_from([
            "termlink", "-e", "htop", "-d", "/tmp", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(args.execute.as_deref(), Some("htop"));
        assert_eq!(args.directory.as_deref(), Some("/tmp"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn rows_require_cols() {
        assert!(Args::try_parse_from(["termlink", "--rows", "40"]).is_err());
        let args = Args::try_parse_from(["termlink", "--rows", "40", "--cols", "120"]).unwrap();
        assert_eq!((args.rows, args.cols), (Some(40), Some(120)));
    }

    #[test]
    fn font_subcommand() {
        let args = Args::try_parse_from(["termlink", "font", "increase"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Font {
                action: FontCommand::Increase
            })
        );

        let args = Args::try_parse_from(["termlink", "font"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Font {
                action: FontCommand::Show
            })
        );
    }
}
