//! Platform install lifecycle and the module entry point.
//!
//! The host exposes its runtime pieces through a [`CapabilityProvider`].
//! Absent capabilities are a normal outcome: [`Installer::install`] logs a
//! warning, returns false and leaves the installer uninstalled so a later
//! call can retry.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::Node;
use crate::error::InstallError;

// =============================================================================
// Capabilities
// =============================================================================

/// An opaque host object (runtime handle, executor, invoker, paint context).
#[derive(Clone)]
pub struct Capability(Arc<dyn Any + Send + Sync>);

impl Capability {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Capability(..)")
    }
}

/// What a successful probe hands to the native install step.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub runtime: Capability,
    pub runtime_executor: Option<Capability>,
    pub call_invoker: Option<Capability>,
    pub paint_context: Capability,
}

/// Host-side lookup of everything install needs.
///
/// Each method returns `None` when the capability does not exist in this
/// host. The paint context belongs to an optional peer library.
pub trait CapabilityProvider {
    fn runtime(&self) -> Option<Capability>;

    fn runtime_executor(&self) -> Option<Capability>;

    fn call_invoker(&self) -> Option<Capability>;

    fn paint_context(&self) -> Option<Capability>;

    /// Wire the module into the host runtime.
    fn install_native(&self, _capabilities: &Capabilities) -> Result<(), InstallError> {
        Ok(())
    }

    /// Tear down whatever `install_native` set up.
    fn invalidate_native(&self) {}
}

// =============================================================================
// Installer
// =============================================================================

#[derive(Debug, Default)]
struct InstallState {
    installed: bool,
    /// Kept across failed installs, dropped on native failure or invalidate.
    paint_context: Option<Capability>,
}

/// Idempotent install / invalidate pair.
#[derive(Debug, Default)]
pub struct Installer {
    state: Mutex<InstallState>,
}

impl Installer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install against `provider`. Returns true once installed.
    pub fn install(&self, provider: &dyn CapabilityProvider) -> bool {
        let mut state = self.state.lock();
        if state.installed {
            return true;
        }
        match Self::try_install(&mut state, provider) {
            Ok(()) => {
                state.installed = true;
                tracing::info!("flexcanvas module installed");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping install");
                false
            }
        }
    }

    fn try_install(
        state: &mut InstallState,
        provider: &dyn CapabilityProvider,
    ) -> Result<(), InstallError> {
        let runtime = provider.runtime().ok_or(InstallError::MissingRuntime)?;

        let paint_context = match &state.paint_context {
            Some(context) => context.clone(),
            None => {
                let context = provider
                    .paint_context()
                    .ok_or(InstallError::MissingPaintContext)?;
                state.paint_context = Some(context.clone());
                context
            }
        };

        let runtime_executor = provider.runtime_executor();
        let call_invoker = provider.call_invoker();
        if runtime_executor.is_none() && call_invoker.is_none() {
            return Err(InstallError::MissingExecutor);
        }

        let capabilities = Capabilities {
            runtime,
            runtime_executor,
            call_invoker,
            paint_context,
        };
        if let Err(err) = provider.install_native(&capabilities) {
            state.paint_context = None;
            return Err(err);
        }
        Ok(())
    }

    /// Tear down and reset to uninstalled.
    pub fn invalidate(&self, provider: &dyn CapabilityProvider) {
        let mut state = self.state.lock();
        provider.invalidate_native();
        state.installed = false;
        state.paint_context = None;
        tracing::debug!("flexcanvas module invalidated");
    }

    pub fn is_installed(&self) -> bool {
        self.state.lock().installed
    }

    /// The module entry point, once installed.
    pub fn module(&self) -> Option<Module> {
        self.is_installed().then_some(Module { _private: () })
    }
}

// =============================================================================
// Module
// =============================================================================

/// Entry point handed to the host after install.
#[derive(Debug, Clone, Copy)]
pub struct Module {
    _private: (),
}

impl Module {
    /// Capability probe: the host calls this to check the module is live.
    pub fn add_numbers(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    pub fn create_node(&self) -> Node {
        Node::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Host {
        runtime: bool,
        executor: bool,
        invoker: bool,
        paint: bool,
        fail_native: AtomicBool,
        native_installs: AtomicUsize,
        paint_lookups: AtomicUsize,
        invalidations: AtomicUsize,
    }

    impl Host {
        fn complete() -> Self {
            Self {
                runtime: true,
                executor: true,
                invoker: true,
                paint: true,
                ..Self::default()
            }
        }
    }

    impl CapabilityProvider for Host {
        fn runtime(&self) -> Option<Capability> {
            self.runtime.then(|| Capability::new(7u64))
        }

        fn runtime_executor(&self) -> Option<Capability> {
            self.executor.then(|| Capability::new("executor"))
        }

        fn call_invoker(&self) -> Option<Capability> {
            self.invoker.then(|| Capability::new("invoker"))
        }

        fn paint_context(&self) -> Option<Capability> {
            self.paint_lookups.fetch_add(1, Ordering::SeqCst);
            self.paint.then(|| Capability::new("paint"))
        }

        fn install_native(&self, capabilities: &Capabilities) -> Result<(), InstallError> {
            assert_eq!(capabilities.runtime.downcast_ref::<u64>(), Some(&7));
            if self.fail_native.load(Ordering::SeqCst) {
                return Err(InstallError::Native("boom".into()));
            }
            self.native_installs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn invalidate_native(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_install_is_idempotent() {
        let host = Host::complete();
        let installer = Installer::new();
        assert!(installer.install(&host));
        assert!(installer.install(&host));
        assert_eq!(host.native_installs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_runtime_fails() {
        let host = Host {
            runtime: false,
            ..Host::complete()
        };
        let installer = Installer::new();
        assert!(!installer.install(&host));
        assert!(installer.module().is_none());
    }

    #[test]
    fn test_either_executor_or_invoker_is_enough() {
        let invoker_only = Host {
            executor: false,
            ..Host::complete()
        };
        assert!(Installer::new().install(&invoker_only));

        let neither = Host {
            executor: false,
            invoker: false,
            ..Host::complete()
        };
        assert!(!Installer::new().install(&neither));
    }

    #[test]
    fn test_retry_succeeds_once_dependencies_appear() {
        let installer = Installer::new();
        let without_paint = Host {
            paint: false,
            ..Host::complete()
        };
        assert!(!installer.install(&without_paint));
        assert!(installer.install(&Host::complete()));
    }

    #[test]
    fn test_paint_context_is_cached_until_native_failure() {
        let host = Host {
            executor: false,
            invoker: false,
            ..Host::complete()
        };
        let installer = Installer::new();
        assert!(!installer.install(&host));
        assert!(!installer.install(&host));
        assert_eq!(host.paint_lookups.load(Ordering::SeqCst), 1);

        let failing = Host::complete();
        failing.fail_native.store(true, Ordering::SeqCst);
        let installer = Installer::new();
        assert!(!installer.install(&failing));
        assert!(!installer.install(&failing));
        assert_eq!(failing.paint_lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_resets() {
        let host = Host::complete();
        let installer = Installer::new();
        assert!(installer.install(&host));
        installer.invalidate(&host);

        assert!(!installer.is_installed());
        assert_eq!(host.invalidations.load(Ordering::SeqCst), 1);
        assert!(installer.install(&host));
        assert_eq!(host.native_installs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_module_probe() {
        let installer = Installer::new();
        assert!(installer.install(&Host::complete()));
        let module = installer.module().unwrap();
        assert_eq!(module.add_numbers(2.0, 3.5), 5.5);
        assert!(module.create_node().node_type().is_none());
    }
}
