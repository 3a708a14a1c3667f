//! Real browser control over the Chrome DevTools Protocol.
//!
//! One [`Browser`] process serves many sessions; every session gets its own
//! browser context so localStorage and cookies never leak between
//! scenarios. Element work goes through `Runtime.evaluate` with the
//! selector compiled to JavaScript by [`Selector::to_all_query`].
//!
//! [`Selector::to_all_query`]: crate::locator::Selector::to_all_query

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::BrowserSettings;
use crate::driver::{no_element, PageDriver};
use crate::harness::SessionFactory;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

fn js_str(s: &str) -> String {
    Value::from(s).to_string()
}

fn driver_err(e: impl std::fmt::Display) -> ProbeError {
    ProbeError::driver(e.to_string())
}

/// A launched Chromium process
#[derive(Debug)]
pub struct Browser {
    settings: BrowserSettings,
    inner: Arc<Mutex<CdpBrowser>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch Chromium
    pub async fn launch(settings: BrowserSettings) -> ProbeResult<Self> {
        if let Some(path) = &settings.chromium_path {
            if !path.exists() {
                return Err(ProbeError::BrowserNotFound);
            }
        }

        let mut builder = CdpConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                ..Viewport::default()
            });
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|message| {
            if message.contains("detect") {
                ProbeError::BrowserNotFound
            } else {
                ProbeError::BrowserLaunch { message }
            }
        })?;

        let (browser, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(headless = settings.headless, "browser launched");
        Ok(Self {
            settings,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Settings the browser was launched with
    #[must_use]
    pub const fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Open a page in a fresh browser context
    pub async fn new_session(&self) -> ProbeResult<ChromiumDriver> {
        let mut browser = self.inner.lock().await;
        let context = browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .map_err(driver_err)?;
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context)
            .build()
            .map_err(ProbeError::driver)?;
        let page = browser.new_page(target).await.map_err(driver_err)?;
        debug!("session opened");
        Ok(ChromiumDriver { page })
    }

    /// Shut the browser down
    pub async fn close(self) -> ProbeResult<()> {
        let mut browser = self.inner.lock().await;
        browser.close().await.map_err(|e| ProbeError::BrowserLaunch {
            message: e.to_string(),
        })?;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser did not exit cleanly");
        }
        drop(browser);
        self.handle.abort();
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for Browser {
    async fn open_session(&self) -> ProbeResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(self.new_session().await?))
    }
}

/// [`PageDriver`] over one CDP page
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: CdpPage,
}

impl ChromiumDriver {
    async fn eval(&self, script: String) -> ProbeResult<Value> {
        let result = self.page.evaluate(script).await.map_err(driver_err)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Run `body` with `el` bound to the locator's first match
    async fn with_element(&self, locator: &Locator, body: &str, missing: &str) -> ProbeResult<Value> {
        self.eval(format!(
            "(() => {{ const el = {}; if (!el) return {missing}; {body} }})()",
            locator.selector().to_query()
        ))
        .await
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        debug!(url, "goto");
        self.page.goto(url).await.map_err(driver_err)?;
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        debug!("reload");
        self.page.reload().await.map_err(driver_err)?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(driver_err)?
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(driver_err)?
            .unwrap_or_default())
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<Value> {
        self.eval(script.to_string()).await
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        debug!("clearing localStorage");
        self.eval("window.localStorage.clear()".to_string()).await?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        let n = self.eval(locator.selector().to_count_query()).await?;
        Ok(n.as_u64().unwrap_or(0) as usize)
    }

    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let visible = self
            .with_element(
                locator,
                "let target = el.tagName === 'OPTION' ? (el.closest('select') || el) : el; \
                 const style = getComputedStyle(target); \
                 if (style.display === 'none' || style.visibility === 'hidden' \
                     || parseFloat(style.opacity) === 0) return false; \
                 const rect = target.getBoundingClientRect(); \
                 return rect.width > 0 && rect.height > 0;",
                "false",
            )
            .await?;
        Ok(visible.as_bool().unwrap_or(false))
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        let text = self
            .with_element(locator, "return el.textContent;", "null")
            .await?;
        Ok(text.as_str().map(str::to_string))
    }

    async fn all_text_contents(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        let texts = self
            .eval(format!(
                "({}).map(el => el.textContent || '')",
                locator.selector().to_all_query("document")
            ))
            .await?;
        Ok(serde_json::from_value(texts).unwrap_or_default())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        let value = self
            .with_element(locator, "return el.value ?? null;", "null")
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let value = self
            .with_element(
                locator,
                &format!("return el.getAttribute({});", js_str(name)),
                "null",
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn has_class(&self, locator: &Locator, class: &str) -> ProbeResult<bool> {
        let has = self
            .with_element(
                locator,
                &format!("return el.classList.contains({});", js_str(class)),
                "false",
            )
            .await?;
        Ok(has.as_bool().unwrap_or(false))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        debug!(%locator, value, "fill");
        let filled = self
            .with_element(
                locator,
                &format!(
                    "el.focus(); \
                     const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value')?.set; \
                     if (setter) {{ setter.call(el, {v}); }} else {{ el.value = {v}; }} \
                     el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                     el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                     return true;",
                    v = js_str(value)
                ),
                "false",
            )
            .await?;
        if filled.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(no_element("fill", locator))
        }
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        debug!(%locator, value, "select");
        let status = self
            .with_element(
                locator,
                &format!(
                    "if (el.tagName !== 'SELECT') return 'not-select'; \
                     const option = Array.from(el.options).find(o => o.value === {v} || o.textContent.trim() === {v}); \
                     if (!option) return 'no-option'; \
                     el.value = option.value; \
                     el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                     el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                     return 'ok';",
                    v = js_str(value)
                ),
                "'missing'",
            )
            .await?;
        match status.as_str() {
            Some("ok") => Ok(()),
            Some("missing") => Err(no_element("select", locator)),
            Some("no-option") => Err(ProbeError::driver(format!(
                "select: {locator} has no option '{value}'"
            ))),
            _ => Err(ProbeError::driver(format!("select: {locator} is not a <select>"))),
        }
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        debug!(%locator, "click");
        let clicked = self
            .with_element(
                locator,
                "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
                "false",
            )
            .await?;
        if clicked.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(no_element("click", locator))
        }
    }

    async fn close(&self) -> ProbeResult<()> {
        self.page.clone().close().await.map_err(driver_err)
    }
}
