//! Application shell
//!
//! `App` owns the onboarding flow, the tab router and one instance of every
//! session. It is the only place that sees more than one session: it reads
//! the live file collection and connection flag when building a chat reply
//! context or the dashboard, and it drains the events sessions raise into the
//! recent-activity feed.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::chat::{ChatSession, KeywordReplySelector, ReplyContext, ReplySelector};
use crate::config::AppConfig;
use crate::dashboard::{ActivityFeed, DashboardSnapshot};
use crate::database::{DatabaseSession, OutcomeProvider, RandomOutcome};
use crate::error::{PlatformError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{FileHandle, FileId, QueryResult, Review, UploadedFile};
use crate::notify::{MeteredNotifier, SharedNotifier};
use crate::onboarding::{Onboarding, Stage};
use crate::reviews::{seed_reviews, ReviewStore};
use crate::router::{ShellEvent, Tab, TabRouter};
use crate::scheduler::Simulated;
use crate::upload::{BatchReport, PlaceholderExtractor, TextExtractor, UploadSession};

/// The pluggable behaviour of the sessions
pub struct Strategies {
    /// Decides whether a connection attempt succeeds
    pub outcome: Box<dyn OutcomeProvider>,
    /// Picks the assistant reply
    pub selector: Box<dyn ReplySelector>,
    /// Turns uploaded files into text
    pub extractor: Box<dyn TextExtractor>,
}

impl Strategies {
    /// Default strategies; `seed` makes connection outcomes reproducible
    pub fn from_config(config: &AppConfig, seed: Option<u64>) -> Self {
        let probability = config.database.success_probability;
        let outcome: Box<dyn OutcomeProvider> = match seed {
            Some(seed) => Box::new(RandomOutcome::seeded(probability, seed)),
            None => Box::new(RandomOutcome::new(probability)),
        };
        Self {
            outcome,
            selector: Box::new(KeywordReplySelector::new(
                crate::chat::default_replies(),
                config.chat.language(),
            )),
            extractor: Box::new(PlaceholderExtractor),
        }
    }
}

/// The whole application: onboarding, navigation and every session
pub struct App {
    onboarding: Onboarding,
    router: TabRouter,
    chat: ChatSession,
    uploads: UploadSession,
    database: DatabaseSession,
    reviews: ReviewStore,
    activity: ActivityFeed,
    now: Duration,
    shut_down: bool,
    metrics: MetricsCollector,
}

impl App {
    /// App with the default strategies
    pub fn new(config: &AppConfig, notifier: SharedNotifier) -> Self {
        Self::with_strategies(config, notifier, Strategies::from_config(config, None))
    }

    /// App with explicit strategies; `notifier` receives every notice
    pub fn with_strategies(config: &AppConfig, notifier: SharedNotifier, strategies: Strategies) -> Self {
        let notifier: SharedNotifier = Arc::new(MeteredNotifier::new(notifier));
        let reviews = if config.reviews.seed_reviews {
            ReviewStore::with_reviews(seed_reviews(), notifier.clone())
        } else {
            ReviewStore::new(notifier.clone())
        };

        Self {
            onboarding: Onboarding::new(config.onboarding.clone()),
            router: TabRouter::new(),
            chat: ChatSession::with_selector(config.chat.clone(), notifier.clone(), strategies.selector),
            uploads: UploadSession::with_extractor(
                config.upload.clone(),
                notifier.clone(),
                strategies.extractor,
            ),
            database: DatabaseSession::with_outcome(config.database.clone(), notifier, strategies.outcome),
            reviews,
            activity: ActivityFeed::default(),
            now: Duration::ZERO,
            shut_down: false,
            metrics: MetricsCollector::default(),
        }
    }

    pub const fn stage(&self) -> Stage {
        self.onboarding.stage()
    }

    pub const fn onboarding(&self) -> &Onboarding {
        &self.onboarding
    }

    /// Virtual time elapsed since start
    pub const fn now(&self) -> Duration {
        self.now
    }

    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub const fn active_tab(&self) -> Tab {
        self.router.active()
    }

    pub const fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatSession {
        &mut self.chat
    }

    pub const fn uploads(&self) -> &UploadSession {
        &self.uploads
    }

    pub const fn database(&self) -> &DatabaseSession {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut DatabaseSession {
        &mut self.database
    }

    pub const fn reviews(&self) -> &ReviewStore {
        &self.reviews
    }

    pub fn reviews_mut(&mut self) -> &mut ReviewStore {
        &mut self.reviews
    }

    pub const fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    /// Leave the welcome screen
    pub fn get_started(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.onboarding.get_started()
    }

    /// Switch tab; returns false when `tab` was already active
    pub fn select_tab(&mut self, tab: Tab) -> Result<bool> {
        self.ensure_main()?;
        let changed = self.router.select(tab);
        if changed {
            self.metrics.record_tab_switch(tab.as_str());
        }
        Ok(changed)
    }

    /// Send `text` as a chat message
    pub fn send_chat(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_main()?;
        let context = ReplyContext {
            file_count: self.uploads.files().len(),
            database_connected: self.database.is_connected(),
        };
        self.chat.set_input(text);
        let language = self.chat.send(context)?.language;
        self.activity.record(
            "Chat multilingue",
            language.map(|l| l.name().to_string()),
        );
        Ok(())
    }

    pub fn upload(&mut self, batch: Vec<FileHandle>) -> Result<BatchReport> {
        self.offer_files(batch.into_iter().map(Ok).collect())
    }

    /// Upload a batch where some files may have failed to load
    pub fn offer_files(&mut self, batch: Vec<Result<FileHandle>>) -> Result<BatchReport> {
        self.ensure_main()?;
        let report = self.uploads.offer(batch);
        self.collect_events();
        Ok(report)
    }

    pub fn remove_file(&mut self, id: FileId) -> Result<UploadedFile> {
        self.ensure_main()?;
        let removed = self.uploads.remove(id)?;
        self.collect_events();
        Ok(removed)
    }

    pub fn connect_database(&mut self) -> Result<()> {
        self.ensure_main()?;
        self.database.connect()
    }

    pub fn disconnect_database(&mut self) -> Result<()> {
        self.ensure_main()?;
        self.database.disconnect()?;
        self.collect_events();
        Ok(())
    }

    pub fn execute_query(&mut self, query: impl Into<String>) -> Result<QueryResult> {
        self.ensure_main()?;
        self.database.set_query_input(query);
        self.database.execute_query().cloned()
    }

    pub fn submit_review(&mut self) -> Result<Review> {
        self.ensure_main()?;
        let review = self.reviews.submit()?.clone();
        self.activity
            .record("Nouvel avis", Some(format!("{}/5 - {}", review.rating, review.title)));
        Ok(review)
    }

    pub fn like_review(&mut self, id: &str) -> Result<u64> {
        self.ensure_main()?;
        self.reviews.like(id)
    }

    pub fn dislike_review(&mut self, id: &str) -> Result<u64> {
        self.ensure_main()?;
        self.reviews.dislike(id)
    }

    pub fn dashboard(&self) -> DashboardSnapshot {
        DashboardSnapshot::build(
            self.uploads.files(),
            self.database.is_connected(),
            &self.activity,
        )
    }

    /// Fire every timer due at or before `now`, across all sessions
    pub fn advance_to(&mut self, now: Duration) {
        if self.shut_down || now < self.now {
            return;
        }
        self.now = now;
        self.onboarding.advance_to(now);
        self.uploads.advance_to(now);
        self.database.advance_to(now);
        self.chat.advance_to(now);
        self.collect_events();
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    /// Earliest pending timer of any session
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.shut_down {
            return None;
        }
        [
            self.onboarding.next_deadline(),
            self.uploads.next_deadline(),
            self.database.next_deadline(),
            self.chat.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every pending timer; nothing changes afterwards
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.onboarding.teardown();
        self.uploads.teardown();
        self.database.teardown();
        self.chat.teardown();
        self.shut_down = true;
        info!(elapsed_ms = self.now.as_millis(), "Application shut down");
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            return Err(PlatformError::InvalidState("application is shut down".into()));
        }
        Ok(())
    }

    fn ensure_main(&self) -> Result<()> {
        self.ensure_running()?;
        if self.stage() != Stage::Main {
            return Err(PlatformError::InvalidState(format!(
                "not available during {:?}",
                self.stage()
            )));
        }
        Ok(())
    }

    fn collect_events(&mut self) {
        let events: Vec<ShellEvent> = self
            .uploads
            .take_events()
            .into_iter()
            .chain(self.database.take_events())
            .collect();

        for event in events {
            debug!(?event, "Shell event");
            match event {
                ShellEvent::FilesChanged { count } => self
                    .activity
                    .record("Documents mis à jour", Some(format!("{count} fichier(s)"))),
                ShellEvent::ConnectionChanged { connected: true } => self.activity.record(
                    "Nouvelle connexion DB",
                    Some(self.database.form().database.clone()),
                ),
                ShellEvent::ConnectionChanged { connected: false } => {
                    self.activity.record("Déconnexion DB", None);
                }
            }
        }
    }
}
