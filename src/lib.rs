//! fitpower-agent - offline caching and push notification agent for the
//! FitPower web app.
//!
//! The agent intercepts requests from the page and decides per request
//! whether to answer from a versioned cache bucket or the network, prunes
//! buckets left by previous versions, and turns push deliveries into
//! notifications. Host primitives (cache storage, network, notifications,
//! window clients) sit behind traits so the routing policy can be driven
//! without a browser.
//!
//! # Example
//!
//! ```no_run
//! use fitpower_agent::{Agent, AgentConfig, FetchRequest};
//! use fitpower_agent::cli::ConsoleHost;
//!
//! # async fn example() -> fitpower_agent::Result<()> {
//! let config = AgentConfig::new().with_origin("http://localhost:8080");
//! let agent = Agent::new(config, ConsoleHost::default())?;
//!
//! agent.install().await?;
//! agent.activate().await?;
//!
//! let request = FetchRequest::navigate(agent.config().resolve("/dashboard")?);
//! let served = agent.handle_fetch(&request).await?;
//! println!("{} from {:?}", served.response.status, served.source);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod agent;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod network;
pub mod notification;
pub mod request;

// Re-export main types for convenience
pub use agent::{Agent, ClickOutcome, ResponseSource, Served};
pub use cache::{CacheStorage, MemoryCacheStorage};
pub use config::{AgentConfig, NetworkConfig, NotificationDefaults};
pub use error::{BestEffort, Error, Result};
pub use format::format_bytes;
pub use host::{Clients, Host, Registration, WindowClient};
pub use network::{HttpNetwork, Network};
pub use notification::{Notification, NotificationData, NotificationOptions, PushPayload};
pub use request::{
    Destination, FetchRequest, RequestClass, RequestKey, RequestMode, Response, Strategy, classify,
};
