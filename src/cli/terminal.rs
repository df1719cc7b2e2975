//! Terminal host: prints what a browser would display.

use async_trait::async_trait;
use console::style;
use uuid::Uuid;

use crate::host::{Clients, Registration, WindowClient};
use crate::notification::Notification;
use crate::Result;

/// Host that renders notifications and window actions to stdout.
#[derive(Debug, Clone, Default)]
pub struct ConsoleHost {
    windows: Vec<WindowClient>,
}

impl ConsoleHost {
    /// Creates a host with one simulated window per URL. The first window
    /// starts out focused.
    #[must_use]
    pub fn new(window_urls: &[String]) -> Self {
        let windows = window_urls
            .iter()
            .enumerate()
            .map(|(i, url)| WindowClient {
                id: format!("window-{}", i + 1),
                url: url.clone(),
                focused: i == 0,
            })
            .collect();
        Self { windows }
    }
}

#[async_trait]
impl Registration for ConsoleHost {
    async fn skip_waiting(&self) -> Result<()> {
        log::info!("Skipping waiting phase");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<()> {
        println!(
            "{} {}",
            style("[notification]").magenta().bold(),
            style(&notification.title).bold()
        );
        if !notification.options.body.is_empty() {
            println!("  {}", notification.options.body);
        }
        if let Some(url) = notification.target_url() {
            println!("  -> {}", style(url).cyan());
        }
        Ok(())
    }

    async fn close_notification(&self, id: Uuid) {
        log::debug!("Closed notification {id}");
    }
}

#[async_trait]
impl Clients for ConsoleHost {
    async fn match_all(&self, _include_uncontrolled: bool) -> Result<Vec<WindowClient>> {
        Ok(self.windows.clone())
    }

    async fn navigate(&self, client: &WindowClient, url: &str) -> Result<()> {
        println!("{} {} {} -> {url}", style("[navigate]").yellow(), client.id, client.url);
        Ok(())
    }

    async fn focus(&self, client: &WindowClient) -> Result<()> {
        if client.focused {
            println!("{} {} (already focused)", style("[focus]").yellow(), client.id);
        } else {
            println!("{} {}", style("[focus]").yellow(), client.id);
        }
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        println!("{} {url}", style("[open]").yellow());
        Ok(())
    }

    async fn claim(&self) -> Result<()> {
        log::info!("Claimed {} client(s)", self.windows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn windows_get_sequential_ids() {
        let host = ConsoleHost::new(&["/".to_string(), "/stats".to_string()]);
        let windows = host.match_all(true).await.unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].id, "window-1");
        assert_eq!(windows[1].id, "window-2");
        assert_eq!(windows[1].url, "/stats");
    }

    #[tokio::test]
    async fn only_first_window_starts_focused() {
        let host = ConsoleHost::new(&["/".to_string(), "/stats".to_string()]);
        let windows = host.match_all(true).await.unwrap();
        assert!(windows[0].focused);
        assert!(!windows[1].focused);
        host.focus(&windows[1]).await.unwrap();
    }

    #[test]
    fn console_host_can_open_windows() {
        assert!(ConsoleHost::default().can_open_window());
    }
}
