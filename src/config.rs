//! Runtime configuration.
//!
//! Defaults cover every field, so a partial JSON document or an empty
//! environment both yield a usable [`Config`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::renderer::DEFAULT_CULL_SIZE;

pub const FRAME_RATE_ENV: &str = "FLEXCANVAS_FRAME_RATE";
pub const LOG_HOST_CALLS_ENV: &str = "FLEXCANVAS_LOG_HOST_CALLS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Render loop ticks per second, see
    /// [`ThreadFrameScheduler::from_config`](crate::ThreadFrameScheduler::from_config).
    pub frame_rate: u32,
    /// Initial fixed width of a view's root. A later `resize` replaces it.
    pub default_width: Option<f32>,
    /// Initial fixed height of a view's root. A later `resize` replaces it.
    pub default_height: Option<f32>,
    /// Wrap the host config in the logging decorator (debug builds only).
    pub log_host_calls: bool,
    /// Picture recording bounds, square.
    pub cull_bounds: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            default_width: None,
            default_height: None,
            log_host_calls: cfg!(debug_assertions),
            cull_bounds: DEFAULT_CULL_SIZE,
        }
    }
}

impl Config {
    /// Defaults overlaid with the `FLEXCANVAS_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.overlay(|name| std::env::var(name).ok());
        config
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn overlay(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(FRAME_RATE_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(rate) if rate > 0 => self.frame_rate = rate,
                _ => tracing::warn!(var = FRAME_RATE_ENV, value = %raw, "ignoring invalid frame rate"),
            }
        }
        if let Some(raw) = lookup(LOG_HOST_CALLS_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.log_host_calls = true,
                "0" | "false" | "no" | "off" => self.log_host_calls = false,
                _ => tracing::warn!(var = LOG_HOST_CALLS_ENV, value = %raw, "ignoring invalid flag"),
            }
        }
    }

    /// Length of one render loop tick.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.frame_rate.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"frameRate": 120, "defaultWidth": 320}"#).unwrap();
        assert_eq!(config.frame_rate, 120);
        assert_eq!(config.default_width, Some(320.0));
        assert_eq!(config.default_height, None);
        assert_eq!(config.cull_bounds, DEFAULT_CULL_SIZE);
    }

    #[test]
    fn test_overlay_parses_and_ignores_garbage() {
        let vars: HashMap<&str, &str> =
            [(FRAME_RATE_ENV, "30"), (LOG_HOST_CALLS_ENV, "maybe")].into();
        let mut config = Config {
            log_host_calls: true,
            ..Config::default()
        };
        config.overlay(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.frame_rate, 30);
        assert!(config.log_host_calls);
    }

    #[test]
    fn test_zero_frame_rate_is_rejected() {
        let mut config = Config::default();
        config.overlay(|name| (name == FRAME_RATE_ENV).then(|| "0".to_string()));
        assert_eq!(config.frame_rate, 60);
    }

    #[test]
    fn test_frame_interval() {
        let config = Config {
            frame_rate: 50,
            ..Config::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
    }
}
