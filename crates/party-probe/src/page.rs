//! Page façade: the character creator page as one object.
//!
//! Composes the form, roster and text components over one session and adds
//! the page lifecycle: navigate, dismiss the cookie banner, reset client
//! state.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::context::PageContext;
use crate::driver::PageDriver;
use crate::form::CharacterForm;
use crate::page_object::PageObject;
use crate::registry::UiElement;
use crate::result::{ProbeError, ProbeResult};
use crate::roster::Roster;
use crate::texts::TextChecks;
use crate::wait::{ExpectedState, WaitOptions};

/// The party character creator
#[derive(Debug, Clone)]
pub struct CharacterCreatorPage {
    ctx: PageContext,
    form: CharacterForm,
    roster: Roster,
    texts: TextChecks,
}

impl CharacterCreatorPage {
    /// Build the page over a session's driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: HarnessConfig) -> Self {
        let ctx = PageContext::new(driver, config);
        Self {
            form: CharacterForm::new(ctx.clone()),
            roster: Roster::new(ctx.clone()),
            texts: TextChecks::new(ctx.clone()),
            ctx,
        }
    }

    /// Form component
    #[must_use]
    pub const fn form(&self) -> &CharacterForm {
        &self.form
    }

    /// Roster component
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Text component
    #[must_use]
    pub const fn texts(&self) -> &TextChecks {
        &self.texts
    }

    /// Session context
    #[must_use]
    pub const fn context(&self) -> &PageContext {
        &self.ctx
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        self.ctx.config()
    }

    /// Navigate to the configured URL and wait for the form
    pub async fn goto(&self) -> ProbeResult<()> {
        let url = &self.config().base_url;
        info!(%url, "opening character creator");
        self.ctx
            .driver()
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.clone(),
                message: e.to_string(),
            })?;
        self.wait_until_loaded().await
    }

    /// Accept the cookie banner if it shows up
    ///
    /// Returns whether a banner was dismissed. A banner that never appears,
    /// or one that cannot be clicked, is not an error.
    pub async fn dismiss_cookie_consent(&self) -> ProbeResult<bool> {
        let driver = self.ctx.driver();
        let timeouts = self.config().timeouts;
        let accept = self.ctx.locate(UiElement::CookieAccept);
        let accept = &accept;

        let shown = self
            .ctx
            .waiter(timeouts.cookie_appear())
            .until(&ExpectedState::CookieBannerVisible, || async move {
                driver.is_visible(accept).await
            })
            .await;
        match shown {
            Ok(_) => {}
            Err(e) if e.is_timeout() => {
                debug!("no cookie banner");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = driver.click(accept).await {
            warn!(error = %e, "cookie banner could not be accepted");
            return Ok(false);
        }
        let hidden = self
            .ctx
            .waiter(timeouts.cookie_hide())
            .until(&ExpectedState::CookieBannerHidden, || async move {
                Ok(!driver.is_visible(accept).await?)
            })
            .await;
        if let Err(e) = hidden {
            warn!(error = %e, "cookie banner still visible after accepting");
        }
        Ok(true)
    }

    /// Clear localStorage and reload so the roster starts empty
    pub async fn clear_client_state(&self) -> ProbeResult<()> {
        debug!("clearing client state");
        let driver = self.ctx.driver();
        driver.clear_local_storage().await?;
        driver.reload().await?;
        self.wait_until_loaded().await
    }

    /// Navigate, dismiss the cookie banner and reset client state
    pub async fn open_fresh(&self) -> ProbeResult<()> {
        self.goto().await?;
        self.dismiss_cookie_consent().await?;
        self.clear_client_state().await
    }

    /// Document title
    pub async fn title(&self) -> ProbeResult<String> {
        self.ctx.driver().title().await
    }

    /// Release the session's page
    pub async fn close(&self) -> ProbeResult<()> {
        self.ctx.driver().close().await
    }
}

#[async_trait]
impl PageObject for CharacterCreatorPage {
    fn url(&self) -> &str {
        &self.config().base_url
    }

    async fn is_loaded(&self) -> ProbeResult<bool> {
        let driver = self.ctx.driver();
        Ok(driver.is_attached(&self.ctx.locate(UiElement::NameInput)).await?
            && driver.is_attached(&self.ctx.locate(UiElement::SubmitButton)).await?)
    }

    fn load_options(&self) -> WaitOptions {
        self.config().timeouts.navigation()
    }

    fn page_name(&self) -> &str {
        "character creator"
    }
}
