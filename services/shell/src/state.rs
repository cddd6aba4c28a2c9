//! Application context
//!
//! Single owner of everything the pages share: persisted flags, the
//! toast queue, the current route and the mounted page's feeds.
//! Lifecycle is explicit: `create`, use, `dispose`. Dropping without
//! `dispose` still cancels the feeds.

use std::sync::Arc;

use market_data::clock::Clock;
use market_data::metrics::EngineMetrics;
use market_data::EngineConfig;
use persistence::{KeyValueStore, Language, Preferences};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ShellError;
use crate::feeds::{HomeFeeds, PageFeeds, PremarketFeeds};
use crate::router::{self, Route};
use crate::toast::{ActionVariant, ToastAction, ToastCommand, ToastKind, ToastQueue, ToastRequest};

const LANGUAGE_UPDATED: &str = "Interface language updated.";
const LANGUAGE_REVERTED: &str = "Reverted to previous language.";
const WALLET_DISCONNECTED: &str = "Wallet disconnected";
const WALLET_DISCONNECTED_BODY: &str = "Your wallet has been disconnected.";

pub struct AppContext {
    preferences: Preferences,
    language: Language,
    wallet_connected: bool,
    toasts: ToastQueue,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
    feed_seed: Option<u64>,
    route: Route,
    page: Option<PageFeeds>,
    disposed: bool,
}

impl AppContext {
    /// Validate the config and load persisted flags. No feeds run until
    /// the first `navigate`.
    pub fn create(
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ShellError> {
        config.validate()?;
        let preferences = Preferences::new(store);
        let language = preferences.language()?;
        let wallet_connected = preferences.wallet_connected()?;

        info!(language = language.code(), wallet_connected, "App context created");
        Ok(Self {
            preferences,
            language,
            wallet_connected,
            toasts: ToastQueue::new(),
            config,
            clock,
            metrics: Arc::new(EngineMetrics::new()),
            feed_seed: None,
            route: Route::NotFound { path: String::new() },
            page: None,
            disposed: false,
        })
    }

    /// Seed all page feeds mounted from now on.
    pub fn with_feed_seed(mut self, seed: u64) -> Self {
        self.feed_seed = Some(seed);
        self
    }

    fn ensure_live(&self) -> Result<(), ShellError> {
        if self.disposed {
            return Err(ShellError::Disposed);
        }
        Ok(())
    }

    // ── Language ────────────────────────────────────────────────────

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch language and push a success toast with a Revert action.
    /// Selecting the current language is a no-op.
    pub fn change_language(&mut self, lang: Language) -> Result<Option<Uuid>, ShellError> {
        self.ensure_live()?;
        if lang == self.language {
            return Ok(None);
        }
        let previous = self.language;
        self.preferences.set_language(lang)?;
        self.language = lang;

        let request = ToastRequest::new(ToastKind::Success, format!("Language: {}", lang.native_label()))
            .body(LANGUAGE_UPDATED)
            .action(ToastAction {
                label: "Revert".to_string(),
                variant: ActionVariant::Secondary,
                command: ToastCommand::RevertLanguage { to: previous },
            });
        Ok(Some(self.toasts.push(request, self.clock.now())))
    }

    // ── Wallet ──────────────────────────────────────────────────────

    pub fn wallet_connected(&self) -> bool {
        self.wallet_connected
    }

    pub fn connect_wallet(&mut self) -> Result<(), ShellError> {
        self.ensure_live()?;
        self.preferences.set_wallet_connected(true)?;
        self.wallet_connected = true;
        info!("Wallet connected");
        Ok(())
    }

    pub fn disconnect_wallet(&mut self) -> Result<Uuid, ShellError> {
        self.ensure_live()?;
        self.preferences.set_wallet_connected(false)?;
        self.wallet_connected = false;
        info!("Wallet disconnected");

        let request = ToastRequest::new(ToastKind::Neutral, WALLET_DISCONNECTED).body(WALLET_DISCONNECTED_BODY);
        Ok(self.toasts.push(request, self.clock.now()))
    }

    // ── Toasts ──────────────────────────────────────────────────────

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn push_toast(&mut self, request: ToastRequest) -> Uuid {
        self.toasts.push(request, self.clock.now())
    }

    pub fn dismiss_toast(&mut self, id: Uuid) -> bool {
        self.toasts.dismiss(id).is_some()
    }

    /// Drop toasts whose duration has elapsed on the context clock.
    pub fn expire_toasts(&mut self) -> usize {
        self.toasts.expire(self.clock.now())
    }

    /// Press a toast button. The toast is dismissed afterwards.
    pub fn run_toast_action(&mut self, id: Uuid, index: usize) -> Result<(), ShellError> {
        self.ensure_live()?;
        let toast = self.toasts.get(id).ok_or(ShellError::ToastNotFound(id))?;
        let command = toast
            .actions
            .get(index)
            .map(|a| a.command)
            .ok_or(ShellError::ToastActionNotFound { id, index })?;
        self.toasts.dismiss(id);

        match command {
            ToastCommand::RevertLanguage { to } => {
                self.preferences.set_language(to)?;
                self.language = to;
                let request = ToastRequest::new(ToastKind::Neutral, format!("Language: {}", to.native_label()))
                    .body(LANGUAGE_REVERTED);
                self.toasts.push(request, self.clock.now());
            }
        }
        Ok(())
    }

    // ── Navigation ──────────────────────────────────────────────────

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Resolve `path`, unmount the previous page's feeds when the page
    /// changes and mount the new page's. Must run inside a tokio runtime
    /// when the target page has feeds.
    pub fn navigate(&mut self, path: &str) -> Result<&Route, ShellError> {
        self.ensure_live()?;
        let route = router::resolve(path);
        if route == self.route && self.page.is_some() {
            return Ok(&self.route);
        }

        if let Some(page) = self.page.take() {
            page.dispose();
        }

        self.page = match route {
            Route::Home => {
                let feeds = HomeFeeds::new(&self.config, Arc::clone(&self.clock), &self.metrics);
                feeds.start(self.feed_seed);
                Some(PageFeeds::Home(feeds))
            }
            Route::Premarket => {
                let feeds = PremarketFeeds::new(&self.config, &self.metrics);
                feeds.start(self.feed_seed);
                Some(PageFeeds::Premarket(feeds))
            }
            _ => None,
        };
        if let Route::NotFound { path } = &route {
            warn!(%path, "No route matched");
        }
        info!(?route, "Navigated");
        self.route = route;
        Ok(&self.route)
    }

    pub fn home_feeds(&self) -> Option<&HomeFeeds> {
        match &self.page {
            Some(PageFeeds::Home(feeds)) => Some(feeds),
            _ => None,
        }
    }

    pub fn premarket_feeds(&self) -> Option<&PremarketFeeds> {
        match &self.page {
            Some(PageFeeds::Premarket(feeds)) => Some(feeds),
            _ => None,
        }
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Cancel all feeds and clear toasts. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(page) = self.page.take() {
            page.dispose();
        }
        self.toasts.clear();
        self.disposed = true;
        info!("App context disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.dispose();
    }
}
