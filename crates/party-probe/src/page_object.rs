//! Page Object Model support.
//!
//! A page object knows where it lives and how to tell that it has finished
//! loading. Navigation helpers build on these two facts.

use async_trait::async_trait;

use crate::result::ProbeResult;
use crate::wait::{ExpectedState, WaitOptions, Waiter};

/// A page (or page region) under test
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Absolute URL of the page
    fn url(&self) -> &str;

    /// Whether the page's anchor elements are present
    async fn is_loaded(&self) -> ProbeResult<bool>;

    /// Bounds for the load wait
    fn load_options(&self) -> WaitOptions {
        WaitOptions::new().with_timeout(30_000)
    }

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Poll [`is_loaded`](Self::is_loaded) until it holds
    async fn wait_until_loaded(&self) -> ProbeResult<()> {
        Waiter::new(self.load_options())
            .until(&ExpectedState::PageLoaded, || self.is_loaded())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct SlowPage {
        polls: AtomicUsize,
    }

    #[async_trait]
    impl PageObject for SlowPage {
        fn url(&self) -> &str {
            "http://localhost/slow"
        }

        async fn is_loaded(&self) -> ProbeResult<bool> {
            Ok(self.polls.fetch_add(1, Ordering::SeqCst) >= 2)
        }

        fn load_options(&self) -> WaitOptions {
            WaitOptions::new().with_timeout(500).with_poll_interval(10)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_loaded_polls() {
        let page = SlowPage::default();
        page.wait_until_loaded().await.unwrap();
        assert_eq!(page.polls.load(Ordering::SeqCst), 3);
        assert!(page.page_name().ends_with("SlowPage"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_loaded_times_out() {
        struct NeverPage;

        #[async_trait]
        impl PageObject for NeverPage {
            fn url(&self) -> &str {
                "http://localhost/never"
            }

            async fn is_loaded(&self) -> ProbeResult<bool> {
                Ok(false)
            }

            fn load_options(&self) -> WaitOptions {
                WaitOptions::new().with_timeout(100).with_poll_interval(10)
            }
        }

        let err = NeverPage.wait_until_loaded().await.unwrap_err();
        assert!(err.to_string().contains("page loaded"));
    }
}
