//! Harness configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, an optional
//! YAML file, `PARTY_PROBE_*` environment variables, then whatever the
//! runner sets from its command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::budget::Budget;
use crate::result::{ProbeError, ProbeResult};
use crate::texts::UiCopy;
use crate::wait::WaitOptions;

/// Default target page
pub const DEFAULT_BASE_URL: &str = "https://howlingtesters.pl/party/";

/// Environment variable overriding the target URL
pub const ENV_URL: &str = "PARTY_PROBE_URL";
/// Environment variable toggling headless mode
pub const ENV_HEADLESS: &str = "PARTY_PROBE_HEADLESS";
/// Environment variable pointing at a Chromium executable
pub const ENV_CHROMIUM: &str = "PARTY_PROBE_CHROMIUM";
/// Environment variable overriding the interaction timeouts
pub const ENV_TIMEOUT_MS: &str = "PARTY_PROBE_TIMEOUT_MS";

/// Bounds for every wait in the synchronization protocol (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Settle time after a primitive action (class marker, readout)
    pub action_ms: u64,
    /// Popup-vs-card race after submit
    pub submit_ms: u64,
    /// Roster container attachment and cardinality
    pub roster_ms: u64,
    /// Retrying text and value assertions
    pub assertion_ms: u64,
    /// Cookie banner appearance
    pub cookie_appear_ms: u64,
    /// Cookie banner disappearance after accepting
    pub cookie_hide_ms: u64,
    /// Page load after navigation
    pub navigation_ms: u64,
    /// Watch for a popup that follows an already rendered card
    pub late_popup_ms: u64,
    /// Poll interval shared by all waits
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: 3000,
            submit_ms: 5000,
            roster_ms: 5000,
            assertion_ms: 5000,
            cookie_appear_ms: 5000,
            cookie_hide_ms: 3000,
            navigation_ms: 30_000,
            late_popup_ms: 300,
            poll_ms: 50,
        }
    }
}

impl Timeouts {
    fn wait(self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_ms)
    }

    /// Bounds for post-action settling
    #[must_use]
    pub fn action(self) -> WaitOptions {
        self.wait(self.action_ms)
    }

    /// Bounds for the submit race
    #[must_use]
    pub fn submit(self) -> WaitOptions {
        self.wait(self.submit_ms)
    }

    /// Bounds for roster waits
    #[must_use]
    pub fn roster(self) -> WaitOptions {
        self.wait(self.roster_ms)
    }

    /// Bounds for retrying assertions
    #[must_use]
    pub fn assertion(self) -> WaitOptions {
        self.wait(self.assertion_ms)
    }

    /// Bounds for the cookie banner to show up
    #[must_use]
    pub fn cookie_appear(self) -> WaitOptions {
        self.wait(self.cookie_appear_ms)
    }

    /// Bounds for the cookie banner to go away
    #[must_use]
    pub fn cookie_hide(self) -> WaitOptions {
        self.wait(self.cookie_hide_ms)
    }

    /// Bounds for page load
    #[must_use]
    pub fn navigation(self) -> WaitOptions {
        self.wait(self.navigation_ms)
    }

    /// Bounds for the late popup check after a popup-less submit
    #[must_use]
    pub fn late_popup(self) -> WaitOptions {
        self.wait(self.late_popup_ms)
    }

    /// Set every interaction bound (not navigation, late popup or polling) at once
    #[must_use]
    pub const fn uniform(mut self, ms: u64) -> Self {
        self.action_ms = ms;
        self.submit_ms = ms;
        self.roster_ms = ms;
        self.assertion_ms = ms;
        self.cookie_appear_ms = ms;
        self.cookie_hide_ms = ms;
        self
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Chromium executable; auto-detected when unset
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox on
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 800,
        }
    }
}

/// Everything a session needs to know about its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Page under test
    pub base_url: String,
    /// Wait bounds
    pub timeouts: Timeouts,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Case-insensitive substrings marking a popup as an acknowledgment
    pub ack_markers: Vec<String>,
    /// Expected static copy
    pub copy: UiCopy,
    /// Point budget the page enforces
    pub budget: Budget,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            browser: BrowserSettings::default(),
            ack_markers: vec!["dodano".to_string()],
            copy: UiCopy::default(),
            budget: Budget::default(),
        }
    }
}

impl HarnessConfig {
    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Defaults, then the optional file, then the process environment
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply `PARTY_PROBE_*` overrides read through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_HEADLESS) {
            self.browser.headless = parse_flag(ENV_HEADLESS, &raw)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM) {
            self.browser.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                ProbeError::config(format!("{ENV_TIMEOUT_MS} must be milliseconds, got '{raw}'"))
            })?;
            self.timeouts = self.timeouts.uniform(ms);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings no session could run with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeouts.poll_ms == 0 {
            return Err(ProbeError::config("timeouts.poll_ms must be positive"));
        }
        if self.ack_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ProbeError::config(
                "ack_markers needs at least one non-empty marker",
            ));
        }
        if !self.budget.is_representable() {
            return Err(ProbeError::config(format!(
                "budget baseline {} + pool {} does not fit a stat field",
                self.budget.baseline, self.budget.pool
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> ProbeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ProbeError::config(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_default_bounds() {
            let t = Timeouts::default();
            assert_eq!(t.action_ms, 3000);
            assert_eq!(t.submit_ms, 5000);
            assert_eq!(t.roster_ms, 5000);
            assert_eq!(t.cookie_appear_ms, 5000);
            assert_eq!(t.cookie_hide_ms, 3000);
            assert_eq!(t.submit().poll_interval_ms, 50);
        }

        #[test]
        fn test_default_config_is_valid() {
            let config = HarnessConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.ack_markers, vec!["dodano".to_string()]);
            assert!(config.browser.headless);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_uniform_leaves_navigation_and_poll() {
            let t = Timeouts::default().uniform(700);
            assert_eq!(t.action_ms, 700);
            assert_eq!(t.cookie_hide_ms, 700);
            assert_eq!(t.navigation_ms, 30_000);
            assert_eq!(t.late_popup_ms, 300);
            assert_eq!(t.poll_ms, 50);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = HarnessConfig::from_yaml_str(
                "base_url: http://localhost:8080/party/\ntimeouts:\n  submit_ms: 9000\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:8080/party/");
            assert_eq!(config.timeouts.submit_ms, 9000);
            assert_eq!(config.timeouts.action_ms, 3000);
            assert_eq!(config.copy, UiCopy::default());
        }

        #[test]
        fn test_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("probe.yaml");
            std::fs::write(&path, "ack_markers: [dodano, added]\nbudget:\n  baseline: 5\n  pool: 3\n")
                .unwrap();
            let config = HarnessConfig::from_yaml_file(&path).unwrap();
            assert_eq!(config.ack_markers.len(), 2);
            assert_eq!(config.budget.total(), 23);
        }

        #[test]
        fn test_invalid_yaml_values_rejected() {
            assert!(HarnessConfig::from_yaml_str("base_url: ftp://nope\n").is_err());
            assert!(HarnessConfig::from_yaml_str("ack_markers: []\n").is_err());
            assert!(HarnessConfig::from_yaml_str("timeouts: [1, 2]\n").is_err());
        }

        #[test]
        fn test_oversized_budget_rejected() {
            let err = HarnessConfig::from_yaml_str("budget:\n  baseline: 4294967295\n  pool: 15\n")
                .unwrap_err();
            assert!(err.to_string().contains("does not fit"));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_env_overrides() {
            let config = HarnessConfig::default()
                .with_env(env(&[
                    (ENV_URL, "http://127.0.0.1:3000/"),
                    (ENV_HEADLESS, "false"),
                    (ENV_CHROMIUM, "/usr/bin/chromium"),
                    (ENV_TIMEOUT_MS, "1200"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:3000/");
            assert!(!config.browser.headless);
            assert_eq!(
                config.browser.chromium_path,
                Some(PathBuf::from("/usr/bin/chromium"))
            );
            assert_eq!(config.timeouts.submit_ms, 1200);
        }

        #[test]
        fn test_env_bad_values() {
            let err = HarnessConfig::default()
                .with_env(env(&[(ENV_HEADLESS, "maybe")]))
                .unwrap_err();
            assert!(err.to_string().contains(ENV_HEADLESS));
            assert!(HarnessConfig::default()
                .with_env(env(&[(ENV_TIMEOUT_MS, "soon")]))
                .is_err());
        }

        #[test]
        fn test_empty_env_is_identity() {
            let config = HarnessConfig::default().with_env(env(&[])).unwrap();
            assert_eq!(config, HarnessConfig::default());
        }
    }
}
