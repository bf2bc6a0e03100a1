use std::{env, path::PathBuf, time::Duration};

use crate::Pixel;

// Gameplay constants, fixed for the lifetime of the process.

pub const GRID_SIZE: Pixel = 20;
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

// Largest board the terminal host will draw, in cells per side.
pub const BOARD_CELLS: Pixel = 20;

pub const TERM_LOG_FILE: &str = "web-snake.log";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ASSET_DIR: &str = "web";

pub fn http_port() -> u16 {
    parse_port(env::var("SNAKE_SERVER_PORT").ok().as_deref())
}

pub fn asset_dir() -> PathBuf {
    env::var("SNAKE_ASSET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSET_DIR))
}

/// `SNAKE_LOG=off` (or `0`, `false`) silences every host's logger.
pub fn logging_enabled() -> bool {
    parse_log_toggle(env::var("SNAKE_LOG").ok().as_deref())
}

fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn parse_log_toggle(value: Option<&str>) -> bool {
    !matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("off" | "0" | "false" | "no")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(parse_port(None), 8080);
        assert_eq!(parse_port(Some("not-a-port")), 8080);
        assert_eq!(parse_port(Some(" 9000 ")), 9000);
    }

    #[test]
    fn logging_is_on_unless_switched_off() {
        assert!(parse_log_toggle(None));
        assert!(parse_log_toggle(Some("on")));
        assert!(!parse_log_toggle(Some("OFF")));
        assert!(!parse_log_toggle(Some("0")));
    }
}
