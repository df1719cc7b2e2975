//! The offline request agent and its event handlers.

use futures::future::{join_all, try_join_all};

use crate::cache::{CacheStorage, MemoryCacheStorage};
use crate::config::AgentConfig;
use crate::error::{BestEffort, Error, Result};
use crate::host::Host;
use crate::network::{HttpNetwork, Network};
use crate::notification::{Notification, PushPayload};
use crate::request::{FetchRequest, RequestKey, Response, Strategy, classify};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
}

/// A response returned to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    const fn network(response: Response) -> Self {
        Self {
            response,
            source: ResponseSource::Network,
        }
    }

    const fn cache(response: Response) -> Self {
        Self {
            response,
            source: ResponseSource::Cache,
        }
    }
}

/// Outcome of a notification click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing window was navigated (best-effort) and focused.
    Focused { client_id: String },
    /// No window was open; a new one was opened.
    Opened,
    /// No window was open and the host cannot open one.
    Ignored,
}

/// Offline caching and push notification agent.
///
/// The host dispatches one event at a time to the handlers below; each handler
/// resolves once its work is finished.
pub struct Agent<H: Host, S: CacheStorage = MemoryCacheStorage, N: Network = HttpNetwork> {
    config: AgentConfig,
    host: H,
    storage: S,
    network: N,
}

impl<H: Host> Agent<H> {
    /// Creates an agent with in-memory cache storage and the HTTP network.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AgentConfig, host: H) -> Result<Self> {
        let network = HttpNetwork::new(&config.network)?;
        Ok(Self {
            config,
            host,
            storage: MemoryCacheStorage::new(),
            network,
        })
    }
}

impl<H: Host, S: CacheStorage, N: Network> Agent<H, S, N> {
    /// Creates an agent with custom storage and network implementations.
    #[must_use]
    pub const fn with_parts(config: AgentConfig, host: H, storage: S, network: N) -> Self {
        Self {
            config,
            host,
            storage,
            network,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Name of the bucket owned by this version.
    #[must_use]
    pub fn cache_name(&self) -> String {
        self.config.cache_name()
    }

    // =========================================================================
    // Install
    // =========================================================================

    /// Handles the install event: opens the current bucket, precaches the
    /// configured paths, then asks the host to skip waiting.
    ///
    /// # Errors
    ///
    /// Any precache failure aborts the install and nothing is stored. A failed
    /// skip-waiting does not fail the install.
    pub async fn install(&self) -> Result<()> {
        let cache = self.cache_name();
        self.storage.open(&cache).await?;
        log::info!("Opened cache {cache}");

        let stored = self.add_all(&cache).await?;
        log::info!("Precached {stored} resources into {cache}");

        self.host.skip_waiting().await.best_effort("skip waiting");
        Ok(())
    }

    /// Fetches every precache path, then stores them all. A network failure or
    /// a response the bucket would refuse fails the whole batch before any
    /// write.
    async fn add_all(&self, cache: &str) -> Result<usize> {
        let requests = self
            .config
            .precache
            .iter()
            .map(|path| self.config.resolve(path).map(FetchRequest::get))
            .collect::<Result<Vec<_>>>()?;

        let entries = try_join_all(requests.iter().map(|request| async move {
            let response = self.network.fetch(request).await?;
            if !response.is_ok() || response.status == 206 {
                return Err(Error::Network(format!(
                    "precache of {} returned status {}",
                    request.url, response.status
                )));
            }
            Ok::<_, Error>((request.key(), response))
        }))
        .await?;

        let count = entries.len();
        for (key, response) in entries {
            self.storage.put(cache, key, response).await?;
        }
        Ok(count)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Handles an intercepted request.
    ///
    /// # Errors
    ///
    /// Returns the network error when neither the network nor the cache can
    /// answer; the page sees this as a failed fetch.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<Served> {
        let class = classify(request);
        let strategy = Strategy::for_class(class);
        log::debug!("{} {} -> {class:?} ({strategy:?})", request.method, request.url);

        match strategy {
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &FetchRequest) -> Result<Served> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(request.key(), response.clone())
                    .await
                    .best_effort("caching network response");
                Ok(Served::network(response))
            }
            Err(err) => {
                log::debug!("Network failed for {}, trying cache: {err}", request.url);
                let cached = self.lookup(&request.key()).await.unwrap_or_else(|e| {
                    log::warn!("Cache lookup failed for {}: {e}", request.url);
                    None
                });
                cached.map(Served::cache).ok_or(err)
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Result<Served> {
        if let Some(hit) = self.lookup(&request.key()).await? {
            return Ok(Served::cache(hit));
        }
        let response = self.network.fetch(request).await?;
        self.store(request.key(), response.clone())
            .await
            .best_effort("caching network response");
        Ok(Served::network(response))
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<Response>> {
        self.storage.match_in(&self.cache_name(), key).await
    }

    async fn store(&self, key: RequestKey, response: Response) -> Result<()> {
        let cache = self.cache_name();
        self.storage.open(&cache).await?;
        self.storage.put(&cache, key, response).await
    }

    // =========================================================================
    // Activate
    // =========================================================================

    /// Handles the activate event: deletes every bucket other than the current
    /// one, then claims open clients. Returns the deleted bucket names.
    ///
    /// # Errors
    ///
    /// Returns the first deletion error after all deletions have finished, or
    /// an error from claiming clients.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let current = self.cache_name();
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != current)
            .collect();

        let results = join_all(stale.iter().map(|name| async move {
            log::info!("Deleting old cache: {name}");
            self.storage.delete(name).await
        }))
        .await;
        results.into_iter().collect::<Result<Vec<_>>>()?;

        self.host.claim().await?;
        Ok(stale)
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Handles a push delivery and returns the notification that was shown.
    ///
    /// A missing payload uses the defaults. An unparseable payload, or a host
    /// failure showing the full notification, shows the fallback instead.
    ///
    /// # Errors
    ///
    /// Only returns an error if the fallback notification also fails.
    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<Notification> {
        let defaults = &self.config.notification;
        match PushPayload::parse(data) {
            Ok(payload) => {
                let notification = Notification::from_payload(payload, defaults);
                match self.host.show_notification(&notification).await {
                    Ok(()) => return Ok(notification),
                    Err(e) => log::warn!("Showing push notification failed: {e}"),
                }
            }
            Err(e) => log::warn!("Push payload rejected: {e}"),
        }

        let fallback = Notification::fallback(defaults);
        self.host.show_notification(&fallback).await?;
        Ok(fallback)
    }

    // =========================================================================
    // Notification click
    // =========================================================================

    /// Handles a notification click: closes it, then navigates and focuses
    /// the first open window, or opens a new one at the target URL.
    ///
    /// # Errors
    ///
    /// Returns an error if clients cannot be listed, or focusing or opening
    /// a window fails. Navigation errors are ignored.
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
    ) -> Result<ClickOutcome> {
        self.host.close_notification(notification.id).await;

        let url = notification
            .target_url()
            .unwrap_or(self.config.notification.default_url.as_str());

        let clients = self.host.match_all(true).await?;
        // Only the first window is handled, even when several are open.
        if let Some(client) = clients.first() {
            self.host
                .navigate(client, url)
                .await
                .best_effort("navigating window");
            self.host.focus(client).await?;
            return Ok(ClickOutcome::Focused {
                client_id: client.id.clone(),
            });
        }

        if self.host.can_open_window() {
            self.host.open_window(url).await?;
            return Ok(ClickOutcome::Opened);
        }
        Ok(ClickOutcome::Ignored)
    }
}
