//! Host primitives the agent drives: registration lifecycle, notification
//! display, and window clients.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::notification::Notification;

/// An open page instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
}

/// The agent's registration with the host.
#[async_trait]
pub trait Registration: Send + Sync {
    /// Activates this version without waiting for old clients to close.
    async fn skip_waiting(&self) -> Result<()>;

    /// Displays a notification.
    async fn show_notification(&self, notification: &Notification) -> Result<()>;

    /// Dismisses a displayed notification.
    async fn close_notification(&self, id: Uuid);
}

/// Window clients visible to the agent.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Lists open windows, optionally including ones this agent does not control.
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>>;

    /// Navigates a window to `url`.
    async fn navigate(&self, client: &WindowClient, url: &str) -> Result<()>;

    /// Brings a window to the foreground.
    async fn focus(&self, client: &WindowClient) -> Result<()>;

    /// Whether the host can open new windows.
    fn can_open_window(&self) -> bool {
        true
    }

    /// Opens a new window at `url`.
    async fn open_window(&self, url: &str) -> Result<()>;

    /// Takes control of every open page in scope.
    async fn claim(&self) -> Result<()>;
}

/// Everything the agent needs from its host besides cache and network.
pub trait Host: Registration + Clients {}

impl<T: Registration + Clients> Host for T {}
