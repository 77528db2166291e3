use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::{ApiError, DogApi, ImageDescriptor};
use crate::config::AppConfig;
use crate::viewer::{ImageCard, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Viewer,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Completion message of one spawned fetch task
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: Result<ImageDescriptor, ApiError>,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Display state
    pub viewer: Viewer,
    pub history: Vec<ImageCard>,
    pub selected_history: usize,

    // Config
    pub config: AppConfig,
    api: DogApi,

    // Fetch plumbing. Tasks send their outcome here; tick() drains it on the
    // UI task, so the viewer is only ever touched from one place.
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    next_seq: u64,
    pub in_flight: usize,
    pub fetched_total: u64,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = DogApi::new(config.endpoint())?;
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Ok(Self {
            section: Section::Viewer,
            popup: Popup::None,

            viewer: Viewer::new(),
            history: Vec::new(),
            selected_history: 0,

            config,
            api,

            outcomes_tx,
            outcomes_rx,
            next_seq: 0,
            in_flight: 0,
            fetched_total: 0,

            status_message: None,
            status_message_time: None,
        })
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Kick off one fetch. Never blocks the event loop; the result comes
    /// back through the outcome channel and is applied in tick().
    pub fn replace_image(&mut self) {
        let api = self.api.clone();
        let tx = self.outcomes_tx.clone();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = api.random_image().await;
            // Receiver gone means the app is shutting down
            let _ = tx.send(FetchOutcome { seq, result });
        });
    }

    /// Apply one completed fetch. Outcomes arrive in completion order, so
    /// with overlapping requests the last-resolving response wins.
    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match outcome.result {
            Ok(descriptor) => {
                tracing::debug!(seq = outcome.seq, url = %descriptor.message, "fetch complete");
                let card = self.viewer.swap(descriptor.message).clone();
                self.push_history(card.clone());
                self.fetched_total += 1;

                if self.config.notifications {
                    let _ = notify_rust::Notification::new()
                        .summary("doggo")
                        .body(&format!("New doggo: {}", card.src))
                        .icon("image-x-generic")
                        .show();
                }
            }
            Err(e) => {
                tracing::error!(seq = outcome.seq, "fetch failed: {}", e);
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    fn push_history(&mut self, card: ImageCard) {
        self.history.push(card);
        let limit = self.config.history_limit.max(1);
        while self.history.len() > limit {
            self.history.remove(0);
        }
        if self.selected_history >= self.history.len() {
            self.selected_history = self.history.len() - 1;
        }
    }

    /// Re-apply a previously fetched image through the normal swap path
    fn recall_selected(&mut self) {
        if let Some(card) = self.history.get(self.selected_history) {
            let src = card.src.clone();
            self.viewer.swap(src);
            self.set_status("Recalled from history");
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Navigation between sections (Viewer ↔ History)
            KeyCode::Tab | KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Viewer => Section::History,
                    Section::History => Section::Viewer,
                };
            }

            // Vertical navigation in the history pane
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Fetch from anywhere
            KeyCode::Char('f') => self.replace_image(),

            // Space/Enter depends on section
            KeyCode::Char(' ') | KeyCode::Enter => match self.section {
                Section::Viewer => self.replace_image(),
                Section::History => self.recall_selected(),
            },

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc
                        | KeyCode::Char('?')
                        | KeyCode::Char('h')
                        | KeyCode::Enter
                        | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn move_down(&mut self) {
        if self.section == Section::History && !self.history.is_empty() {
            self.selected_history = (self.selected_history + 1) % self.history.len();
        }
    }

    fn move_up(&mut self) {
        if self.section == Section::History && !self.history.is_empty() {
            self.selected_history = self
                .selected_history
                .checked_sub(1)
                .unwrap_or(self.history.len() - 1);
        }
    }

    pub fn tick(&mut self) {
        // Apply completed fetches in arrival order
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply_outcome(outcome);
        }

        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::CAPTION;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_app() -> App {
        App::new(AppConfig::default()).unwrap()
    }

    fn descriptor(url: &str) -> ImageDescriptor {
        ImageDescriptor {
            message: url.to_string(),
            status: "success".to_string(),
        }
    }

    #[tokio::test]
    async fn applied_outcome_swaps_the_viewer() {
        let mut app = test_app();
        app.outcomes_tx
            .send(FetchOutcome {
                seq: 0,
                result: Ok(descriptor("https://x/a.png")),
            })
            .unwrap();

        app.tick();

        let card = app.viewer.image().expect("card created");
        assert_eq!(card.src, "https://x/a.png");
        assert_eq!(card.alt, CAPTION);
        assert_eq!(app.history.len(), 1);
    }

    #[tokio::test]
    async fn last_resolving_outcome_wins() {
        let mut app = test_app();

        // seq 1 resolves before seq 0; application follows completion order
        app.outcomes_tx
            .send(FetchOutcome {
                seq: 1,
                result: Ok(descriptor("https://x/b.png")),
            })
            .unwrap();
        app.outcomes_tx
            .send(FetchOutcome {
                seq: 0,
                result: Ok(descriptor("https://x/a.png")),
            })
            .unwrap();

        app.tick();

        let card = app.viewer.image().unwrap();
        assert_eq!(card.src, "https://x/a.png");
        assert_eq!(app.history.len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_viewer_unchanged_and_is_reported() {
        let mut app = test_app();
        app.outcomes_tx
            .send(FetchOutcome {
                seq: 0,
                result: Ok(descriptor("https://x/a.png")),
            })
            .unwrap();
        app.tick();

        app.outcomes_tx
            .send(FetchOutcome {
                seq: 1,
                result: Err(ApiError::Upstream),
            })
            .unwrap();
        app.tick();

        // Prior state kept, failure visible on the status line
        assert_eq!(app.viewer.image().unwrap().src, "https://x/a.png");
        let status = app.status_message.as_deref().expect("status set");
        assert!(status.starts_with("Error:"));
    }

    #[tokio::test]
    async fn failed_fetch_on_empty_viewer_keeps_it_empty() {
        let mut app = test_app();
        app.outcomes_tx
            .send(FetchOutcome {
                seq: 0,
                result: Err(ApiError::Request("connect refused".to_string())),
            })
            .unwrap();
        app.tick();

        assert!(app.viewer.is_empty());
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn history_is_capped() {
        let mut app = test_app();
        app.config.history_limit = 3;

        for i in 0..5 {
            app.outcomes_tx
                .send(FetchOutcome {
                    seq: i,
                    result: Ok(descriptor(&format!("https://x/{}.png", i))),
                })
                .unwrap();
        }
        app.tick();

        assert_eq!(app.history.len(), 3);
        // Oldest entries dropped first
        assert_eq!(app.history[0].src, "https://x/2.png");
        assert_eq!(app.viewer.image().unwrap().src, "https://x/4.png");
    }

    #[tokio::test]
    async fn replace_image_end_to_end() {
        // Single canned response on a local port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let body = r#"{"message":"https://x/e2e.png","status":"success"}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        let config = AppConfig {
            endpoint: Some(format!("http://{}", addr)),
            ..AppConfig::default()
        };
        let mut app = App::new(config).unwrap();
        app.replace_image();
        assert_eq!(app.in_flight, 1);

        // Drain until the outcome lands
        for _ in 0..100 {
            app.tick();
            if !app.viewer.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let card = app.viewer.image().expect("fetch applied");
        assert_eq!(card.src, "https://x/e2e.png");
        assert_eq!(card.alt, CAPTION);
        assert_eq!(app.in_flight, 0);
    }
}
