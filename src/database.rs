//! Simulated database connection
//!
//! `disconnected → connecting → connected`, and back to `disconnected` on
//! demand. Nothing is ever sent anywhere: the connection outcome comes from an
//! [`OutcomeProvider`] and every query returns the same canned rows.

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseSessionConfig;
use crate::error::{PlatformError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{DatabaseConfig, DatabaseKind, QueryResult, ResultRow};
use crate::notify::{Notification, SharedNotifier};
use crate::router::ShellEvent;
use crate::scheduler::{Simulated, Timers};
use crate::validation::InputValidator;

/// Tables listed once connected
pub const ILLUSTRATIVE_TABLES: [&str; 5] = ["users", "products", "orders", "categories", "reviews"];

/// Queries offered as one-click suggestions
pub const SUGGESTED_QUERIES: [&str; 4] = [
    "SELECT * FROM users LIMIT 10",
    "SELECT COUNT(*) FROM products",
    "SELECT * FROM orders WHERE date >= '2024-01-01'",
    "SELECT category, COUNT(*) FROM products GROUP BY category",
];

/// Rows returned by every simulated query
pub fn canned_rows() -> Vec<ResultRow> {
    (1..=3)
        .map(|i| ResultRow {
            id: i,
            name: format!("Utilisateur {i}"),
            email: format!("user{i}@example.com"),
            created_at: format!("2024-01-{}", 14 + i),
        })
        .collect()
}

/// Decides whether a connection attempt succeeds
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeProvider: Send {
    fn connect_succeeds(&mut self, config: &DatabaseConfig) -> bool;
}

/// Succeeds with a fixed probability
pub struct RandomOutcome {
    probability: f64,
    rng: StdRng,
}

impl RandomOutcome {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible draws for scripted runs
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl OutcomeProvider for RandomOutcome {
    fn connect_succeeds(&mut self, _config: &DatabaseConfig) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Always returns the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub bool);

impl OutcomeProvider for FixedOutcome {
    fn connect_succeeds(&mut self, _config: &DatabaseConfig) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatabaseEvent {
    ConnectResolved,
}

/// Connection form, connection state and query history
pub struct DatabaseSession {
    state: ConnectionState,
    form: DatabaseConfig,
    query_input: String,
    tables: Vec<String>,
    history: Vec<QueryResult>,
    settings: DatabaseSessionConfig,
    outcome: Box<dyn OutcomeProvider>,
    notifier: SharedNotifier,
    timers: Timers<DatabaseEvent>,
    outbox: Vec<ShellEvent>,
    metrics: MetricsCollector,
}

impl DatabaseSession {
    pub fn new(settings: DatabaseSessionConfig, notifier: SharedNotifier) -> Self {
        let outcome = Box::new(RandomOutcome::new(settings.success_probability));
        Self::with_outcome(settings, notifier, outcome)
    }

    pub fn with_outcome(
        settings: DatabaseSessionConfig,
        notifier: SharedNotifier,
        outcome: Box<dyn OutcomeProvider>,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            form: DatabaseConfig::default(),
            query_input: String::new(),
            tables: Vec::new(),
            history: Vec::new(),
            settings,
            outcome,
            notifier,
            timers: Timers::new(),
            outbox: Vec::new(),
            metrics: MetricsCollector::default(),
        }
    }

    /// Current connection state
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// The flag shared with the rest of the application
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Connection form as typed so far
    pub fn form(&self) -> &DatabaseConfig {
        &self.form
    }

    /// Edit the connection form
    pub fn form_mut(&mut self) -> &mut DatabaseConfig {
        &mut self.form
    }

    /// Change engine; the port is reset to the engine's default
    pub fn set_kind(&mut self, kind: DatabaseKind) {
        self.form.kind = kind;
        self.form.port = kind.default_port().to_string();
    }

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    pub fn set_query_input(&mut self, query: impl Into<String>) {
        self.query_input = query.into();
    }

    /// Tables listed while connected
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Executed queries, most recent first
    pub fn history(&self) -> &[QueryResult] {
        &self.history
    }

    /// Drain the events raised for the shell since the last call
    pub fn take_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Start a connection attempt with the current form
    pub fn connect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Disconnected {
            return Err(PlatformError::InvalidState(format!(
                "cannot connect while {:?}",
                self.state
            )));
        }

        let checks = InputValidator::validate_required("database", &self.form.database)
            .and_then(|()| InputValidator::validate_required("username", &self.form.username));
        if let Err(err) = checks {
            self.notifier.notify(Notification::destructive(
                "Champs requis",
                "Veuillez remplir tous les champs obligatoires",
            ));
            return Err(err);
        }
        if let Err(err) = InputValidator::validate_port(&self.form.port) {
            self.notifier
                .notify(Notification::destructive("Port invalide", err.to_string()));
            return Err(err);
        }

        self.state = ConnectionState::Connecting;
        info!(
            kind = self.form.kind.label(),
            host = %self.form.host,
            database = %self.form.database,
            "Connecting"
        );
        self.timers
            .schedule(self.settings.connect_delay(), DatabaseEvent::ConnectResolved);
        Ok(())
    }

    /// Drop the connection, its tables and its history
    pub fn disconnect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(PlatformError::InvalidState("not connected".into()));
        }

        self.state = ConnectionState::Disconnected;
        self.tables.clear();
        self.history.clear();
        self.connection_changed(false);
        info!(database = %self.form.database, "Disconnected");
        self.notifier.notify(Notification::info(
            "Déconnexion",
            "Déconnecté de la base de données",
        ));
        Ok(())
    }

    /// Run the query input against the simulated connection
    pub fn execute_query(&mut self) -> Result<&QueryResult> {
        if self.state != ConnectionState::Connected {
            return Err(PlatformError::InvalidState("not connected".into()));
        }

        if let Err(err) = InputValidator::validate_query(&self.query_input) {
            self.notifier.notify(Notification::destructive(
                "Requête vide",
                "Veuillez saisir une requête SQL",
            ));
            return Err(err);
        }

        let result = QueryResult {
            query: std::mem::take(&mut self.query_input),
            rows: canned_rows(),
            timestamp: Local::now(),
        };
        info!(query = %result.query, rows = result.rows.len(), "Query executed");
        self.notifier.notify(Notification::success(
            "Requête exécutée",
            format!("{} résultat(s) trouvé(s)", result.rows.len()),
        ));
        self.metrics.record_query();

        self.history.insert(0, result);
        self.history.truncate(self.settings.history_limit);
        Ok(&self.history[0])
    }

    fn connection_changed(&mut self, connected: bool) {
        self.metrics.set_database_connected(connected);
        self.outbox.push(ShellEvent::ConnectionChanged { connected });
    }

    fn handle(&mut self, event: DatabaseEvent) {
        match event {
            DatabaseEvent::ConnectResolved => {
                if self.state != ConnectionState::Connecting {
                    return;
                }
                let success = self.outcome.connect_succeeds(&self.form);
                self.metrics
                    .record_connect_attempt(self.form.kind.label(), success);

                if success {
                    self.state = ConnectionState::Connected;
                    self.tables = ILLUSTRATIVE_TABLES.iter().map(ToString::to_string).collect();
                    self.connection_changed(true);
                    info!(database = %self.form.database, "Connected");
                    self.notifier.notify(Notification::success(
                        "Connexion réussie",
                        format!("Connecté à la base de données {}", self.form.database),
                    ));
                } else {
                    self.state = ConnectionState::Disconnected;
                    warn!(database = %self.form.database, "Connection failed");
                    self.notifier.notify(Notification::destructive(
                        "Erreur de connexion",
                        "Impossible de se connecter à la base de données",
                    ));
                }
            }
        }
    }
}

impl Simulated for DatabaseSession {
    fn advance_to(&mut self, now: Duration) {
        while let Some((_, event)) = self.timers.pop_due(now) {
            self.handle(event);
        }
        self.timers.advance_clock(now);
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
    }
}
