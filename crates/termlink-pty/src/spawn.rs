//! Starting a shell: resolve what to run, open a PTY pair, attach a reader.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use termlink_config::schema::ShellConfig;

use super::types::{PtyControl, PtyHandle, PtyOutput, PtyWriter, PTY_MAX_OUTPUT_PER_FRAME, PTY_READ_CHUNK};

// =============================================================================
// SHELL RESOLUTION
// =============================================================================

/// The shell used when none is configured.
///
/// On Unix this is the login shell from the user's passwd entry, then
/// `$SHELL`, then `/bin/bash`. On Windows it is `powershell.exe`.
pub fn default_shell() -> String {
    if cfg!(windows) {
        return "powershell.exe".to_string();
    }
    passwd_shell()
        .or_else(|| std::env::var("SHELL").ok().and_then(nonblank))
        .unwrap_or_else(|| "/bin/bash".to_string())
}

fn nonblank(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

#[cfg(unix)]
fn passwd_shell() -> Option<String> {
    use nix::unistd::{Uid, User};

    match User::from_uid(Uid::current()) {
        Ok(user) => user.and_then(|u| nonblank(u.shell.to_string_lossy().into_owned())),
        Err(e) => {
            tracing::debug!(error = %e, "passwd lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn passwd_shell() -> Option<String> {
    None
}

/// Host variables passed through to the shell on every platform.
const PASSTHROUGH_COMMON: &[&str] = &["PATH", "LANG", "LC_ALL", "LC_CTYPE", "TMPDIR", "TMP", "TEMP"];

#[cfg(unix)]
const PASSTHROUGH_PLATFORM: &[&str] = &[
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XDG_RUNTIME_DIR",
];

#[cfg(windows)]
const PASSTHROUGH_PLATFORM: &[&str] = &[
    "USERPROFILE",
    "USERNAME",
    "APPDATA",
    "LOCALAPPDATA",
    "SYSTEMROOT",
    "COMSPEC",
    "HOMEDRIVE",
    "HOMEPATH",
];

fn passthrough_vars() -> impl Iterator<Item = &'static str> {
    PASSTHROUGH_COMMON.iter().chain(PASSTHROUGH_PLATFORM).copied()
}

/// Everything needed to start the shell, resolved up front.
///
/// The environment starts empty: only the passthrough list, configured
/// extras and `TERM` reach the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellPlan {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl ShellPlan {
    pub(crate) fn from_config(config: &ShellConfig, term: &str) -> Self {
        let program = match config.program.trim() {
            "" => default_shell(),
            p => p.to_string(),
        };

        let mut args = Vec::with_capacity(config.args.len() + 1);
        if config.login_shell && cfg!(unix) {
            args.push("-l".to_string());
        }
        args.extend(config.args.iter().cloned());

        let mut env: Vec<(String, String)> = passthrough_vars()
            .filter_map(|key| std::env::var(key).ok().map(|val| (key.to_string(), val)))
            .collect();
        env.extend(config.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env.push(("TERM".to_string(), term.to_string()));

        Self {
            program,
            args,
            cwd: config.working_directory.as_ref().map(PathBuf::from),
            env,
        }
    }

    fn command(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.env_clear();
        cmd.args(&self.args);
        // Later entries win, so configured extras override the host
        for (key, val) in &self.env {
            cmd.env(key, val);
        }
        if let Some(dir) = &self.cwd {
            cmd.cwd(dir);
        }
        cmd
    }
}

// =============================================================================
// SPAWN
// =============================================================================

/// Forward everything the PTY produces to a channel until end-of-stream.
///
/// The channel disconnects when the shell side closes, which is how the
/// handle detects exit.
fn spawn_reader(mut reader: Box<dyn Read + Send>) -> Result<mpsc::Receiver<Vec<u8>>, String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("pty-reader".to_string())
        .spawn(move || {
            let mut buf = vec![0u8; PTY_READ_CHUNK];
            loop {
                let n = match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "pty read ended");
                        break;
                    }
                };
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            tracing::trace!("pty reader finished");
        })
        .map_err(|e| format!("cannot start PTY reader: {e}"))?;
    Ok(rx)
}

/// Start the configured shell in a new `rows` x `cols` PTY.
pub fn spawn_pty(config: &ShellConfig, term: &str, rows: u16, cols: u16) -> Result<PtyHandle, String> {
    let plan = ShellPlan::from_config(config, term);
    let size = PtySize {
        rows,
        cols,
        ..PtySize::default()
    };

    let pair = native_pty_system()
        .openpty(size)
        .map_err(|e| format!("cannot open PTY: {e}"))?;
    let child = pair
        .slave
        .spawn_command(plan.command())
        .map_err(|e| format!("cannot start '{}': {e}", plan.program))?;
    // The child holds its own copy of the slave
    drop(pair.slave);

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| format!("cannot read from PTY: {e}"))?;
    let writer = pair
        .master
        .take_writer()
        .map_err(|e| format!("cannot write to PTY: {e}"))?;
    let output_rx = spawn_reader(reader)?;

    tracing::info!(
        shell = %plan.program,
        pid = ?child.process_id(),
        rows,
        cols,
        "shell spawned"
    );

    Ok(PtyHandle {
        writer: PtyWriter { writer },
        output: PtyOutput {
            output_rx,
            pending: Vec::new(),
            max_output: PTY_MAX_OUTPUT_PER_FRAME,
        },
        control: PtyControl {
            child,
            master: pair.master,
            size,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(program: &str) -> ShellConfig {
        ShellConfig {
            program: program.into(),
            ..Default::default()
        }
    }

    fn env_value<'a>(plan: &'a ShellPlan, key: &str) -> Option<&'a str> {
        plan.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn blank_program_falls_back_to_default_shell() {
        assert!(!default_shell().is_empty());
        assert_eq!(ShellPlan::from_config(&config("  "), "xterm").program, default_shell());
        assert_eq!(ShellPlan::from_config(&config("/bin/sh"), "xterm").program, "/bin/sh");
    }

    #[cfg(unix)]
    #[test]
    fn passwd_login_shell_comes_first() {
        if let Some(shell) = passwd_shell() {
            assert_eq!(default_shell(), shell);
        }
        assert_eq!(nonblank("  ".into()), None);
        assert_eq!(nonblank("/bin/zsh".into()).as_deref(), Some("/bin/zsh"));
    }

    #[test]
    fn term_is_always_set() {
        let plan = ShellPlan::from_config(&config("/bin/sh"), "xterm-256color");
        assert_eq!(env_value(&plan, "TERM"), Some("xterm-256color"));
    }

    #[test]
    fn configured_env_overrides_host() {
        let mut cfg = config("/bin/sh");
        cfg.env.insert("PATH".into(), "/opt/bin".into());
        cfg.env.insert("EDITOR".into(), "vi".into());

        let plan = ShellPlan::from_config(&cfg, "xterm");
        assert_eq!(env_value(&plan, "PATH"), Some("/opt/bin"));
        assert_eq!(env_value(&plan, "EDITOR"), Some("vi"));
    }

    #[test]
    fn passthrough_list_has_no_secrets() {
        assert!(passthrough_vars().any(|v| v == "PATH"));
        for var in passthrough_vars() {
            let lower = var.to_lowercase();
            for needle in ["key", "secret", "token", "password"] {
                assert!(!lower.contains(needle), "{var} should not be passed through");
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn login_flag_comes_before_configured_args() {
        let mut cfg = config("/bin/sh");
        cfg.login_shell = true;
        cfg.args = vec!["-c".into(), "true".into()];
        cfg.working_directory = Some("/tmp".into());

        let plan = ShellPlan::from_config(&cfg, "xterm");
        assert_eq!(plan.args, ["-l", "-c", "true"]);
        assert_eq!(plan.cwd, Some(PathBuf::from("/tmp")));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_reports_size() {
        let mut handle = spawn_pty(&config("/bin/sh"), "xterm-256color", 24, 80).unwrap();
        assert_eq!(handle.control.size(), (24, 80));
        handle.control.kill();
    }

    #[cfg(unix)]
    #[test]
    fn missing_program_names_it_in_the_error() {
        let err = spawn_pty(&config("/definitely/not/a/shell"), "xterm-256color", 24, 80).unwrap_err();
        assert!(err.contains("/definitely/not/a/shell"), "got: {err}");
    }
}
