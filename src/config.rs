//! Editor configuration parsed from environment variables.

use canvas::config::{EditorConfig, LiveFeedback};
use canvas::geometry::Size;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const BOARD_WIDTH_VAR: &str = "PASTEBOARD_BOARD_WIDTH";
pub const BOARD_HEIGHT_VAR: &str = "PASTEBOARD_BOARD_HEIGHT";
pub const GRID_SIZE_VAR: &str = "PASTEBOARD_GRID_SIZE";
pub const COARSE_GRID_SIZE_VAR: &str = "PASTEBOARD_COARSE_GRID_SIZE";
pub const HISTORY_LIMIT_VAR: &str = "PASTEBOARD_HISTORY_LIMIT";
pub const DEAD_ZONE_VAR: &str = "PASTEBOARD_DEAD_ZONE";
pub const LIVE_FEEDBACK_VAR: &str = "PASTEBOARD_LIVE_FEEDBACK";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse `{value}`")]
    Parse { var: &'static str, value: String },
    #[error("{var}: `{value}` is out of range")]
    OutOfRange { var: &'static str, value: String },
}

/// Build the editor config from the process environment.
///
/// Optional:
/// - `PASTEBOARD_BOARD_WIDTH` / `PASTEBOARD_BOARD_HEIGHT`: positive, default 1920x1080
/// - `PASTEBOARD_GRID_SIZE`: positive, default 22
/// - `PASTEBOARD_COARSE_GRID_SIZE`: positive, default 44
/// - `PASTEBOARD_HISTORY_LIMIT`: at least 1, default 100
/// - `PASTEBOARD_DEAD_ZONE`: non-negative, default 3
/// - `PASTEBOARD_LIVE_FEEDBACK`: `precise` (default) or `coarse`
///
/// # Errors
///
/// Returns a [`ConfigError`] for the first variable that is set but invalid.
pub fn from_env() -> Result<EditorConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`from_env`], reading variables through `lookup`.
///
/// # Errors
///
/// Returns a [`ConfigError`] for the first variable that is set but invalid.
pub fn from_lookup<F>(lookup: F) -> Result<EditorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = EditorConfig::default();
    let width = positive(&lookup, BOARD_WIDTH_VAR, defaults.board.width)?;
    let height = positive(&lookup, BOARD_HEIGHT_VAR, defaults.board.height)?;

    let history_limit = match lookup(HISTORY_LIMIT_VAR) {
        None => defaults.history_limit,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) => return Err(ConfigError::OutOfRange { var: HISTORY_LIMIT_VAR, value: raw }),
            Ok(limit) => limit,
            Err(_) => return Err(ConfigError::Parse { var: HISTORY_LIMIT_VAR, value: raw }),
        },
    };

    let dead_zone = match parse_f64(&lookup, DEAD_ZONE_VAR)? {
        None => defaults.dead_zone,
        Some((v, _)) if v >= 0.0 => v,
        Some((_, raw)) => return Err(ConfigError::OutOfRange { var: DEAD_ZONE_VAR, value: raw }),
    };

    let live_feedback = match lookup(LIVE_FEEDBACK_VAR) {
        None => defaults.live_feedback,
        Some(raw) => match raw.trim() {
            "precise" => LiveFeedback::Precise,
            "coarse" => LiveFeedback::Coarse,
            _ => return Err(ConfigError::Parse { var: LIVE_FEEDBACK_VAR, value: raw }),
        },
    };

    Ok(EditorConfig {
        board: Size::new(width, height),
        grid_size: positive(&lookup, GRID_SIZE_VAR, defaults.grid_size)?,
        coarse_grid_size: positive(&lookup, COARSE_GRID_SIZE_VAR, defaults.coarse_grid_size)?,
        history_limit,
        dead_zone,
        live_feedback,
        ..defaults
    })
}

/// A finite number, with the raw text kept for error reporting.
fn parse_f64<F>(lookup: &F, var: &'static str) -> Result<Option<(f64, String)>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some((v, raw))),
        _ => Err(ConfigError::Parse { var, value: raw }),
    }
}

fn positive<F>(lookup: &F, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_f64(lookup, var)? {
        None => Ok(default),
        Some((v, _)) if v > 0.0 => Ok(v),
        Some((_, raw)) => Err(ConfigError::OutOfRange { var, value: raw }),
    }
}
