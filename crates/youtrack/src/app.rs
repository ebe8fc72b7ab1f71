//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use youtrack::app::App;
//! use youtrack::config::Overrides;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::connect(&Overrides::default()).await?;
//!     let me = app.tracker().current_user().await?;
//!     println!("Logged in as {}", me.login);
//!     Ok(())
//! }
//! ```

use crate::client::{IssueTracker, YouTrackClient};
use crate::config::{Overrides, Settings};
use crate::error::{Error, Result};

/// Application context for CLI operations.
///
/// Holds the resolved settings and the tracker that commands run against.
pub struct App {
    /// The tracker (trait object so tests can swap in a mock)
    tracker: Box<dyn IssueTracker>,

    /// Resolved settings
    settings: Settings,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("settings", &self.settings)
            .field("tracker", &"<dyn IssueTracker>")
            .finish()
    }
}

impl App {
    /// Resolve settings and build the REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL or token is missing after layering
    /// - An explicitly named config file cannot be read
    /// - The HTTP client cannot be built
    pub async fn connect(overrides: &Overrides) -> Result<Self> {
        Self::from_settings(Settings::load(overrides).await?)
    }

    /// Build the REST client for already resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let client = YouTrackClient::new(&settings)?;
        tracing::debug!(url = %settings.base_url, "Connected client");
        Ok(Self::new(Box::new(client), settings))
    }

    /// Build an app around an existing tracker.
    pub fn new(tracker: Box<dyn IssueTracker>, settings: Settings) -> Self {
        Self { tracker, settings }
    }

    /// Get the tracker.
    pub fn tracker(&self) -> &dyn IssueTracker {
        self.tracker.as_ref()
    }

    /// Get the resolved settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Pick the project for a command: the explicit one, else the default.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when neither is set.
    pub fn project_or_default(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(self.settings.default_project.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::invalid(
                    "project",
                    "no project given; pass --project or set a default project",
                )
            })
    }
}
