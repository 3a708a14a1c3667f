//! Auto-retrying assertions (Playwright's `expect()`).
//!
//! `expect(driver, locator).to_have_text("Legolas").await?` polls the live
//! page until the observation matches or the locator's timeout runs out,
//! then fails with [`ProbeError::AssertionMismatch`] carrying the expected
//! value and the last value observed.

use std::fmt;
use std::sync::Mutex;

use crate::driver::{normalize_text, PageDriver};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{ExpectedState, WaitOptions, Waiter};

/// One observation of a locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// Text content (`None` when nothing matches)
    Text(Option<String>),
    /// Form control value
    Value(Option<String>),
    /// Attribute value
    Attribute(Option<String>),
    /// Number of matches
    Count(usize),
    /// Visibility of the first match
    Visible(bool),
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(Some(s)) | Self::Value(Some(s)) | Self::Attribute(Some(s)) => {
                f.write_str(&normalize_text(s))
            }
            Self::Text(None) | Self::Value(None) | Self::Attribute(None) => {
                f.write_str("<missing>")
            }
            Self::Count(n) => write!(f, "{n}"),
            Self::Visible(true) => f.write_str("visible"),
            Self::Visible(false) => f.write_str("hidden"),
        }
    }
}

/// Assertion types for `expect()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectAssertion {
    /// Element has exact text (whitespace-normalized)
    HasText(String),
    /// Element contains text
    ContainsText(String),
    /// Form control has value
    HasValue(String),
    /// Attribute has value
    HasAttribute {
        /// Attribute name
        name: String,
        /// Expected value
        expected: String,
    },
    /// Element count matches
    HasCount(usize),
    /// First match is visible
    IsVisible,
    /// Nothing visible matches
    IsHidden,
    /// At least one match exists
    IsAttached,
}

impl ExpectAssertion {
    /// Short description, e.g. `to have text "Legolas"`
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::HasText(t) => format!("to have text {t:?}"),
            Self::ContainsText(t) => format!("to contain text {t:?}"),
            Self::HasValue(v) => format!("to have value {v:?}"),
            Self::HasAttribute { name, expected } => {
                format!("to have attribute {name}={expected:?}")
            }
            Self::HasCount(n) => format!("to have count {n}"),
            Self::IsVisible => "to be visible".to_string(),
            Self::IsHidden => "to be hidden".to_string(),
            Self::IsAttached => "to be attached".to_string(),
        }
    }

    /// Expected value as shown in failures
    #[must_use]
    pub fn expected(&self) -> String {
        match self {
            Self::HasText(t) | Self::ContainsText(t) | Self::HasValue(t) => t.clone(),
            Self::HasAttribute { expected, .. } => expected.clone(),
            Self::HasCount(n) => n.to_string(),
            Self::IsVisible => "visible".to_string(),
            Self::IsHidden => "hidden".to_string(),
            Self::IsAttached => "at least 1".to_string(),
        }
    }

    /// Read what this assertion needs from the page
    pub async fn observe(&self, driver: &dyn PageDriver, locator: &Locator) -> ProbeResult<Observed> {
        Ok(match self {
            Self::HasText(_) | Self::ContainsText(_) => {
                Observed::Text(driver.text_content(locator).await?)
            }
            Self::HasValue(_) => Observed::Value(driver.input_value(locator).await?),
            Self::HasAttribute { name, .. } => {
                Observed::Attribute(driver.attribute(locator, name).await?)
            }
            Self::HasCount(_) | Self::IsAttached => Observed::Count(driver.count(locator).await?),
            Self::IsVisible | Self::IsHidden => Observed::Visible(driver.is_visible(locator).await?),
        })
    }

    /// Whether an observation satisfies the assertion
    #[must_use]
    pub fn matches(&self, observed: &Observed) -> bool {
        match (self, observed) {
            (Self::HasText(expected), Observed::Text(Some(actual))) => {
                normalize_text(actual) == normalize_text(expected)
            }
            (Self::ContainsText(expected), Observed::Text(Some(actual))) => {
                normalize_text(actual).contains(&normalize_text(expected))
            }
            (Self::HasValue(expected), Observed::Value(Some(actual))) => actual == expected,
            (Self::HasAttribute { expected, .. }, Observed::Attribute(Some(actual))) => {
                actual == expected
            }
            (Self::HasCount(expected), Observed::Count(actual)) => actual == expected,
            (Self::IsAttached, Observed::Count(actual)) => *actual > 0,
            (Self::IsVisible, Observed::Visible(v)) => *v,
            (Self::IsHidden, Observed::Visible(v)) => !*v,
            _ => false,
        }
    }

    /// Validate an observation synchronously
    pub fn validate(&self, subject: &str, observed: &Observed) -> ProbeResult<()> {
        if self.matches(observed) {
            Ok(())
        } else {
            Err(ProbeError::mismatch(subject, self.expected(), observed))
        }
    }
}

/// Smart assertion builder for locators
#[derive(Debug)]
pub struct Expect<'a> {
    driver: &'a dyn PageDriver,
    locator: Locator,
    options: WaitOptions,
}

/// Create an expectation for a locator (Playwright-style)
#[must_use]
pub fn expect(driver: &dyn PageDriver, locator: Locator) -> Expect<'_> {
    let opts = locator.options();
    let options = WaitOptions::new()
        .with_timeout(opts.timeout.as_millis() as u64)
        .with_poll_interval(opts.poll_interval.as_millis() as u64);
    Expect {
        driver,
        locator,
        options,
    }
}

impl Expect<'_> {
    /// Override the retry bounds
    #[must_use]
    pub const fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Poll until the assertion holds
    pub async fn satisfy(&self, assertion: ExpectAssertion) -> ProbeResult<()> {
        let subject = self.locator.description();
        let state = ExpectedState::Condition(format!("{subject} {}", assertion.describe()));
        let last = Mutex::new(None::<Observed>);

        let outcome = Waiter::new(self.options)
            .until(&state, || {
                let (driver, locator, assertion, last) =
                    (self.driver, &self.locator, &assertion, &last);
                async move {
                    let observed = assertion.observe(driver, locator).await?;
                    let ok = assertion.matches(&observed);
                    if let Ok(mut slot) = last.lock() {
                        *slot = Some(observed);
                    }
                    Ok(ok)
                }
            })
            .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(e) if e.is_timeout() => {
                let observed = last.lock().ok().and_then(|mut slot| slot.take());
                match observed {
                    Some(observed) => assertion.validate(&subject, &observed).and(Err(e)),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Assert the element has specific text
    pub async fn to_have_text(&self, expected: impl Into<String>) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::HasText(expected.into())).await
    }

    /// Assert the element contains text
    pub async fn to_contain_text(&self, text: impl Into<String>) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::ContainsText(text.into())).await
    }

    /// Assert the form control has a value
    pub async fn to_have_value(&self, value: impl Into<String>) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::HasValue(value.into())).await
    }

    /// Assert an attribute value
    pub async fn to_have_attribute(
        &self,
        name: impl Into<String>,
        expected: impl Into<String>,
    ) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::HasAttribute {
            name: name.into(),
            expected: expected.into(),
        })
        .await
    }

    /// Assert the element count
    pub async fn to_have_count(&self, count: usize) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::HasCount(count)).await
    }

    /// Assert the element is visible
    pub async fn to_be_visible(&self) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::IsVisible).await
    }

    /// Assert the element is hidden
    pub async fn to_be_hidden(&self) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::IsHidden).await
    }

    /// Assert the element is in the document
    pub async fn to_be_attached(&self) -> ProbeResult<()> {
        self.satisfy(ExpectAssertion::IsAttached).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod validate_tests {
        use super::*;

        #[test]
        fn test_has_text_normalizes_whitespace() {
            let assertion = ExpectAssertion::HasText("Siła: 15".to_string());
            assert!(assertion.matches(&Observed::Text(Some("  Siła:\n 15 ".to_string()))));
            assert!(!assertion.matches(&Observed::Text(Some("Siła: 14".to_string()))));
            assert!(!assertion.matches(&Observed::Text(None)));
        }

        #[test]
        fn test_contains_text() {
            let assertion = ExpectAssertion::ContainsText("Wybierz imiona".to_string());
            assert!(assertion.matches(&Observed::Text(Some(
                "Wybierz imiona, rasy i klasy".to_string()
            ))));
        }

        #[test]
        fn test_count_and_visibility() {
            assert!(ExpectAssertion::HasCount(2).matches(&Observed::Count(2)));
            assert!(!ExpectAssertion::HasCount(2).matches(&Observed::Count(3)));
            assert!(ExpectAssertion::IsAttached.matches(&Observed::Count(1)));
            assert!(ExpectAssertion::IsHidden.matches(&Observed::Visible(false)));
            assert!(!ExpectAssertion::IsVisible.matches(&Observed::Visible(false)));
        }

        #[test]
        fn test_mismatched_observation_kind_fails() {
            assert!(!ExpectAssertion::HasCount(1).matches(&Observed::Visible(true)));
        }

        #[test]
        fn test_validate_reports_both_values() {
            let err = ExpectAssertion::HasValue("Aragorn".to_string())
                .validate("name field", &Observed::Value(Some(String::new())))
                .unwrap_err();
            assert!(err.is_mismatch());
            assert!(err.to_string().contains("name field"));
            assert!(err.to_string().contains("Aragorn"));
        }

        #[test]
        fn test_missing_renders_placeholder() {
            assert_eq!(Observed::Text(None).to_string(), "<missing>");
            assert_eq!(Observed::Visible(true).to_string(), "visible");
        }
    }

    mod retry_tests {
        use super::*;
        use crate::registry::{LocatorRegistry, UiElement};
        use crate::simulator::SimulatedCreator;
        use std::time::Duration;

        const URL: &str = "https://howlingtesters.pl/party/";

        #[tokio::test(start_paused = true)]
        async fn test_expect_passes_on_live_value() {
            let page = SimulatedCreator::new();
            page.goto(URL).await.unwrap();
            let title = LocatorRegistry::new().locate(UiElement::MainTitle);
            expect(&page, title).to_have_text("Stwórz drużynę").await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_failure_carries_last_observation() {
            let page = SimulatedCreator::new();
            page.goto(URL).await.unwrap();
            let title = LocatorRegistry::new()
                .locate(UiElement::MainTitle)
                .with_timeout(Duration::from_millis(200));
            let err = expect(&page, title)
                .to_have_text("Stwórz armię")
                .await
                .unwrap_err();
            match err {
                ProbeError::AssertionMismatch {
                    subject,
                    expected,
                    actual,
                } => {
                    assert_eq!(subject, "main title");
                    assert_eq!(expected, "Stwórz armię");
                    assert_eq!(actual, "Stwórz drużynę");
                }
                other => panic!("expected mismatch, got {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_count_on_empty_roster() {
            let page = SimulatedCreator::new();
            page.goto(URL).await.unwrap();
            let cards = LocatorRegistry::new().locate(UiElement::RosterCards);
            expect(&page, cards).to_have_count(0).await.unwrap();
        }
    }
}
