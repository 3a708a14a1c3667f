//! Wait mechanisms for the synchronization protocol.
//!
//! Nothing in the harness sleeps for a fixed duration. Every action is
//! followed by a bounded poll for the state it should produce, and a poll
//! that runs out of time fails with [`ProbeError::Timeout`] naming that
//! state.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::draft::CharacterClass;
use crate::result::{ProbeError, ProbeResult};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// A UI state the harness waits for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedState {
    /// Page content is present after navigation
    PageLoaded,
    /// The tile for a class carries the selected marker
    ClassSelected(CharacterClass),
    /// Exactly one class tile carries the selected marker
    SingleClassSelected,
    /// The points readout shows a value
    PointsReadoutPopulated,
    /// The roster container is in the document
    RosterAttached,
    /// The feedback popup is visible
    PopupVisible,
    /// The feedback popup is gone
    PopupHidden,
    /// At least one card is visible in the roster
    CardRendered,
    /// The roster holds more cards than the given count
    RosterGrewFrom(usize),
    /// The roster holds exactly the given count
    RosterCount(usize),
    /// The cookie banner accept button is visible
    CookieBannerVisible,
    /// The cookie banner is gone
    CookieBannerHidden,
    /// Free-form condition, usually an expectation on a locator
    Condition(String),
}

impl fmt::Display for ExpectedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageLoaded => f.write_str("page loaded"),
            Self::ClassSelected(c) => write!(f, "class '{c}' to carry the selected marker"),
            Self::SingleClassSelected => f.write_str("exactly one class selected"),
            Self::PointsReadoutPopulated => f.write_str("points readout populated"),
            Self::RosterAttached => f.write_str("roster container attached"),
            Self::PopupVisible => f.write_str("popup visible"),
            Self::PopupHidden => f.write_str("popup hidden"),
            Self::CardRendered => f.write_str("roster card visible"),
            Self::RosterGrewFrom(n) => write!(f, "new roster card (more than {n})"),
            Self::RosterCount(n) => write!(f, "roster count {n}"),
            Self::CookieBannerVisible => f.write_str("cookie banner visible"),
            Self::CookieBannerHidden => f.write_str("cookie banner hidden"),
            Self::Condition(c) => f.write_str(c),
        }
    }
}

/// Bounds for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Which of two raced states materialized first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstOf<A, B> {
    /// The first state won
    First(A),
    /// The second state won
    Second(B),
}

/// Bounded poller
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given bounds
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Bounds of this waiter
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll until `probe` yields a value
    ///
    /// The probe runs at least once, even with a zero timeout. Probe errors
    /// abort the wait immediately.
    pub async fn until_some<T, F, Fut>(&self, state: &ExpectedState, mut probe: F) -> ProbeResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<Option<T>>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        loop {
            if let Some(value) = probe().await? {
                debug!(state = %state, elapsed_ms = start.elapsed().as_millis() as u64, "state reached");
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(state = %state, timeout_ms = self.options.timeout_ms, "wait timed out");
                return Err(ProbeError::timeout(state.to_string(), self.options.timeout_ms));
            }
            tokio::time::sleep(self.options.poll_interval().min(timeout - elapsed)).await;
        }
    }

    /// Poll until `probe` reports true
    pub async fn until<F, Fut>(&self, state: &ExpectedState, mut probe: F) -> ProbeResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        let start = Instant::now();
        self.until_some(state, || {
            let check = probe();
            async move { Ok(check.await?.then_some(())) }
        })
        .await?;
        Ok(WaitResult {
            elapsed: start.elapsed(),
            waited_for: state.to_string(),
        })
    }

    /// Race two bounded polls; whichever state materializes first wins
    ///
    /// On a tie within one poll tick the first state wins. When both polls
    /// time out the error names both states. A probe error from either side
    /// ends the race.
    pub async fn first_of<A, B, FA, FB, FutA, FutB>(
        &self,
        (state_a, probe_a): (&ExpectedState, FA),
        (state_b, probe_b): (&ExpectedState, FB),
    ) -> ProbeResult<FirstOf<A, B>>
    where
        FA: FnMut() -> FutA,
        FutA: Future<Output = ProbeResult<Option<A>>>,
        FB: FnMut() -> FutB,
        FutB: Future<Output = ProbeResult<Option<B>>>,
    {
        let first = self.until_some(state_a, probe_a);
        let second = self.until_some(state_b, probe_b);
        tokio::pin!(first);
        tokio::pin!(second);
        let mut first_done = false;
        let mut second_done = false;

        loop {
            tokio::select! {
                biased;
                res = &mut first, if !first_done => match res {
                    Ok(value) => return Ok(FirstOf::First(value)),
                    Err(e) if e.is_timeout() => first_done = true,
                    Err(e) => return Err(e),
                },
                res = &mut second, if !second_done => match res {
                    Ok(value) => return Ok(FirstOf::Second(value)),
                    Err(e) if e.is_timeout() => second_done = true,
                    Err(e) => return Err(e),
                },
                else => {
                    return Err(ProbeError::timeout(
                        format!("{state_a} or {state_b}"),
                        self.options.timeout_ms,
                    ));
                }
            }
        }
    }
}
