//! Per-session context shared by the page components.
//!
//! One [`PageContext`] belongs to exactly one session: one driver (one
//! isolated page), the locator registry and the configuration. Components
//! clone it cheaply; nothing in it is shared across sessions.

use std::sync::Arc;

use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::expect::{expect, Expect};
use crate::locator::Locator;
use crate::registry::{LocatorRegistry, UiElement};
use crate::wait::{WaitOptions, Waiter};

/// Driver, registry and configuration for one session
#[derive(Debug, Clone)]
pub struct PageContext {
    driver: Arc<dyn PageDriver>,
    registry: LocatorRegistry,
    config: Arc<HarnessConfig>,
}

impl PageContext {
    /// Create a context for one session
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: HarnessConfig) -> Self {
        Self {
            driver,
            registry: LocatorRegistry::new(),
            config: Arc::new(config),
        }
    }

    /// The session's driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Shared handle to the driver
    #[must_use]
    pub fn driver_handle(&self) -> Arc<dyn PageDriver> {
        Arc::clone(&self.driver)
    }

    /// Locator registry
    #[must_use]
    pub const fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Locator for an element
    #[must_use]
    pub fn locate(&self, element: UiElement) -> Locator {
        self.registry.locate(element)
    }

    /// Waiter with the given bounds
    #[must_use]
    pub const fn waiter(&self, options: WaitOptions) -> Waiter {
        Waiter::new(options)
    }

    /// Retrying assertion bounded by the assertion timeout
    #[must_use]
    pub fn expect(&self, locator: Locator) -> Expect<'_> {
        expect(self.driver(), locator).with_options(self.config.timeouts.assertion())
    }
}
