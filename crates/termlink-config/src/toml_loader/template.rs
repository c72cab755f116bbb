//! Commented default config written on first run.

pub(super) fn default_config_toml() -> &'static str {
    r##"# termlink configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[shell]
# program = ""            # empty: $SHELL, then /bin/bash (powershell.exe on Windows)
# args = []
# working_directory = "~/src"
# login_shell = false

[shell.env]
# EDITOR = "nvim"

[terminal]
# rows = 24               # 1-500, used until the view reports its size
# cols = 80               # 1-500
# term = "xterm-256color"

[performance]
# frame_rate = 60         # 1-240 output polls per second
# max_output_per_frame = 65536

[input]
# queue_capacity = 1024   # 1-65536 pending input events
# write_retries = 2       # 0-10
# retry_backoff_ms = 10   # 0-5000

[output]
# read_failure_limit = 0  # 0 retries forever
# max_backoff_ms = 1000   # 1-60000

[logging]
# level = "INFO"          # DEBUG, INFO, WARNING, ERROR
# file_logging = true
"##
}
