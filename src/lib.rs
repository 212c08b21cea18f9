//! Plateforme IA - local multilingual assistant simulator
//!
//! A console application that plays out the full user journey of a local AI
//! assistant without any real AI, network or database behind it.
//!
//! # Features
//!
//! - Loading splash and welcome screen
//! - Multilingual chat with keyword-based canned replies (fr, wo, en, es)
//! - Document upload with a simulated extraction pipeline
//! - Simulated database connection and canned query results
//! - Review submission, reactions, filtering and statistics
//! - Export of chat, queries and reviews (TXT, CSV, JSON)
//!
//! Every delay runs on a virtual clock, so the whole application can be
//! driven step by step from tests or scripts.

/// Application shell owning every session
pub mod app;
/// Simulated chat session and reply selection
pub mod chat;
/// Configuration management
pub mod config;
/// Console commands, scripts and the interactive shell
pub mod console;
/// Dashboard summary and activity feed
pub mod dashboard;
/// Simulated database connection
pub mod database;
/// Error types
pub mod error;
/// File export
pub mod export;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Notification boundary
pub mod notify;
/// Loading and welcome screens
pub mod onboarding;
/// Review store
pub mod reviews;
/// Tab routing
pub mod router;
/// Virtual-time timers
pub mod scheduler;
/// Document upload pipeline
pub mod upload;
/// Input validation and sanitization
pub mod validation;
/// Text rendering of the current screen
pub mod view;

// Re-export key components for easier access
pub use app::{App, Strategies};
pub use config::AppConfig;
pub use error::{PlatformError, Result};
pub use models::{Language, Message, OutputFormat, Review};
pub use notify::{Notification, Notifier, SharedNotifier};
pub use onboarding::Stage;
pub use router::Tab;
