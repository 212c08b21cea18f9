//! Tab routing for the main application

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::PlatformError;

/// Events children send up to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    /// The uploaded-file collection changed size or content
    FilesChanged { count: usize },
    /// The database connection flag flipped
    ConnectionChanged { connected: bool },
}

/// Tabs of the main application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Chat,
    Upload,
    Database,
    Reviews,
}

impl Tab {
    /// Every tab, in navigation order
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Chat,
        Self::Upload,
        Self::Database,
        Self::Reviews,
    ];

    /// Navigation label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Accueil",
            Self::Chat => "Chat IA",
            Self::Upload => "Documents",
            Self::Database => "Base de données",
            Self::Reviews => "Avis",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Chat => "chat",
            Self::Upload => "upload",
            Self::Database => "database",
            Self::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| PlatformError::Validation(format!("Unknown tab: {s}")))
    }
}

/// Holds the active tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabRouter {
    active: Tab,
}

impl TabRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn active(&self) -> Tab {
        self.active
    }

    /// Make `tab` active; returns false when it already was
    pub fn select(&mut self, tab: Tab) -> bool {
        if self.active == tab {
            return false;
        }
        debug!(from = %self.active, to = %tab, "Switching tab");
        self.active = tab;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tab_is_dashboard() {
        assert_eq!(TabRouter::new().active(), Tab::Dashboard);
    }

    #[test]
    fn test_reselect_is_noop() {
        let mut router = TabRouter::new();
        assert!(router.select(Tab::Chat));
        assert!(!router.select(Tab::Chat));
        assert_eq!(router.active(), Tab::Chat);
    }

    #[test]
    fn test_parse_tab() {
        assert_eq!("Reviews".parse::<Tab>().unwrap(), Tab::Reviews);
        assert!("settings".parse::<Tab>().is_err());
    }
}
