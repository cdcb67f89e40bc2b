//! Reconciler - the host-config seam between a declarative description
//! and the node tree.
//!
//! ```text
//! Element tree ──► MountedTree::update ──► HostConfig callbacks ──► Node ops
//!                     (positional diff)      (SceneHostConfig,
//!                                             optionally logged)
//! ```

mod host_config;
mod logging;
mod tree;

use std::sync::Arc;

pub use host_config::{HostConfig, HostProps, SceneHostConfig, UpdatePriority};
pub use logging::LoggingHostConfig;
pub use tree::{Element, HostElement, MountedTree};

use crate::config::Config;

/// The host config a view should use for `config`.
///
/// Host calls are traced only in debug builds with `log_host_calls` set.
pub fn host_config(config: &Config) -> Arc<dyn HostConfig> {
    if cfg!(debug_assertions) && config.log_host_calls {
        Arc::new(LoggingHostConfig::new(SceneHostConfig::new()))
    } else {
        Arc::new(SceneHostConfig::new())
    }
}
