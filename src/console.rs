//! Line-oriented console over an [`App`]
//!
//! One command per line. Scripts run against the virtual clock only, so a
//! script gives the same result on every run; the interactive shell keeps the
//! virtual clock in step with real time and fires timers as they fall due.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::error::{PlatformError, Result};
use crate::export::{write_query_history, write_reviews, write_transcript};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{DatabaseKind, FileHandle, FileId, Language, OutputFormat, ReviewCategory};
use crate::notify::{Notification, Notifier, Severity};
use crate::onboarding::Stage;
use crate::router::Tab;
use crate::view::render;

/// What an `export` command writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    /// Chat transcript
    Chat,
    /// Query history
    Queries,
    /// Every review
    Reviews,
}

/// Connection form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatabaseField {
    /// Server host
    Host,
    /// Server port
    Port,
    /// Database name
    Database,
    /// User name
    Username,
    /// Password
    Password,
}

/// Review form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewField {
    /// Author name
    Author,
    /// Title
    Title,
    /// Comment body
    Comment,
    /// Rating from 1 to 5
    Rating,
    /// Review language
    Language,
    /// Review topic
    Category,
}

/// Review filter criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterField {
    /// Exact rating
    Rating,
    /// Exact topic
    Category,
    /// Exact language
    Language,
}

/// A parsed console command
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "plateforme-ia",
    about = "Commandes de la console",
    no_binary_name = true,
    disable_version_flag = true
)]
pub enum Command {
    /// Quitter l'écran d'accueil
    Start,
    /// Changer d'onglet (dashboard, chat, upload, database, reviews)
    Tab { tab: Tab },
    /// Afficher l'écran courant
    Status,
    /// Envoyer un message
    Send {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Langue des réponses (fr, wo, en, es)
    Lang { language: Language },
    /// Activer ou désactiver le micro
    Voice,
    /// Uploader des fichiers
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Supprimer un fichier
    Remove { id: u64 },
    /// Type de base (mysql, postgresql, sqlite, mongodb)
    DbKind { kind: DatabaseKind },
    /// Remplir un champ de connexion
    DbSet {
        #[arg(value_enum)]
        field: DatabaseField,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Se connecter à la base
    Connect,
    /// Se déconnecter
    Disconnect,
    /// Exécuter une requête
    Query {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        sql: Vec<String>,
    },
    /// Remplir un champ du formulaire d'avis
    ReviewSet {
        #[arg(value_enum)]
        field: ReviewField,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Publier l'avis
    ReviewSubmit,
    /// Aimer un avis
    Like { id: String },
    /// Ne pas aimer un avis
    Dislike { id: String },
    /// Filtrer les avis
    Filter {
        #[arg(value_enum)]
        field: FilterField,
        value: String,
    },
    /// Retirer les filtres
    FilterClear,
    /// Exporter vers un fichier (txt, csv, json)
    Export {
        #[arg(value_enum)]
        target: ExportTarget,
        format: OutputFormat,
        path: PathBuf,
    },
    /// Avancer l'horloge de <ms> millisecondes
    Wait { ms: u64 },
    /// Quitter
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Name used in logs and metrics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Tab { .. } => "tab",
            Self::Status => "status",
            Self::Send { .. } => "send",
            Self::Lang { .. } => "lang",
            Self::Voice => "voice",
            Self::Upload { .. } => "upload",
            Self::Remove { .. } => "remove",
            Self::DbKind { .. } => "db-kind",
            Self::DbSet { .. } => "db-set",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Query { .. } => "query",
            Self::ReviewSet { .. } => "review-set",
            Self::ReviewSubmit => "review-submit",
            Self::Like { .. } => "like",
            Self::Dislike { .. } => "dislike",
            Self::Filter { .. } => "filter",
            Self::FilterClear => "filter-clear",
            Self::Export { .. } => "export",
            Self::Wait { .. } => "wait",
            Self::Quit => "quit",
        }
    }

    /// Parse one console line
    pub fn parse_line(line: &str) -> std::result::Result<Self, clap::Error> {
        Self::try_parse_from(line.split_whitespace())
    }
}

/// The command list, as printed by `help`
pub fn help() -> String {
    Command::command().render_help().to_string()
}

/// Build a file handle from a path, guessing the declared type from the
/// extension. Files above `max_size_bytes` are not read.
pub fn load_file(path: &Path, max_size_bytes: u64) -> Result<FileHandle> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let unreadable = |source: std::io::Error| PlatformError::Unreadable {
        name: name.clone(),
        source,
    };
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let size = std::fs::metadata(path).map_err(unreadable)?.len();

    if size > max_size_bytes {
        debug!(file = %name, size, "Skipping read of oversized file");
        return Ok(FileHandle::declared(name, mime_type, size));
    }
    let bytes = std::fs::read(path).map_err(unreadable)?;
    Ok(FileHandle::new(name, mime_type, bytes))
}

/// Prints notices on stdout as they are emitted
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.severity {
            Severity::Info => "i",
            Severity::Success => "+",
            Severity::Destructive => "!",
        };
        println!("[{marker}] {} - {}", notification.title, notification.description);
    }
}

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading; the text, if any, is shown to the user
    Continue(Option<String>),
    Quit,
}

/// Runs console commands against an [`App`]
pub struct Console {
    app: App,
    max_file_size_bytes: u64,
    /// Virtual time skipped with `wait` in the interactive shell
    skipped: Duration,
    metrics: MetricsCollector,
}

impl Console {
    pub fn new(app: App, max_file_size_bytes: u64) -> Self {
        Self {
            app,
            max_file_size_bytes,
            skipped: Duration::ZERO,
            metrics: MetricsCollector::default(),
        }
    }

    pub const fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Parse and run one line; blank lines and `#` comments do nothing
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue(None));
        }
        match Command::parse_line(line) {
            Ok(command) => self.execute(command),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                Ok(Flow::Continue(Some(err.render().to_string())))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Run a parsed command, timing it
    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        let name = command.name();
        let timer = OperationTimer::new(name);
        let result = self.dispatch(command);
        self.metrics.record_command(name, timer.finish());
        if let Err(err) = &result {
            debug!(command = name, error = %err, "Command failed");
        }
        result
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        let text = match command {
            Command::Start => {
                self.app.get_started()?;
                Some(render(&self.app))
            }
            Command::Tab { tab } => {
                self.app.select_tab(tab)?;
                Some(render(&self.app))
            }
            Command::Status => Some(render(&self.app)),
            Command::Send { words } => {
                self.app.send_chat(words.join(" "))?;
                None
            }
            Command::Lang { language } => {
                self.app.chat_mut().select_language(language);
                Some(format!("Langue: {}", language.name()))
            }
            Command::Voice => {
                let listening = self.app.chat_mut().toggle_voice();
                Some(if listening { "Micro activé" } else { "Micro désactivé" }.to_string())
            }
            Command::Upload { paths } => {
                let batch = paths
                    .iter()
                    .map(|path| load_file(path, self.max_file_size_bytes))
                    .collect();
                let report = self.app.offer_files(batch)?;
                let ids: Vec<String> = report.accepted.iter().map(ToString::to_string).collect();
                Some(format!(
                    "{} fichier(s) accepté(s) [{}], {} refusé(s)",
                    report.accepted.len(),
                    ids.join(", "),
                    report.rejected.len()
                ))
            }
            Command::Remove { id } => {
                let removed = self.app.remove_file(FileId(id))?;
                Some(format!("{} supprimé", removed.file.name))
            }
            Command::DbKind { kind } => {
                self.app.database_mut().set_kind(kind);
                None
            }
            Command::DbSet { field, value } => {
                self.set_database_field(field, value.join(" "));
                None
            }
            Command::Connect => {
                self.app.connect_database()?;
                Some("Connexion en cours...".to_string())
            }
            Command::Disconnect => {
                self.app.disconnect_database()?;
                None
            }
            Command::Query { sql } => {
                let result = self.app.execute_query(sql.join(" "))?;
                let rows: Vec<String> = result
                    .rows
                    .iter()
                    .map(|r| format!("{} | {} | {} | {}", r.id, r.name, r.email, r.created_at))
                    .collect();
                Some(rows.join("\n"))
            }
            Command::ReviewSet { field, value } => {
                self.set_review_field(field, value.join(" "))?;
                None
            }
            Command::ReviewSubmit => {
                let review = self.app.submit_review()?;
                Some(format!("Avis #{} publié", review.id))
            }
            Command::Like { id } => Some(format!("+{}", self.app.like_review(&id)?)),
            Command::Dislike { id } => Some(format!("-{}", self.app.dislike_review(&id)?)),
            Command::Filter { field, value } => {
                self.set_filter_field(field, &value)?;
                Some(render(&self.app))
            }
            Command::FilterClear => {
                self.app.reviews_mut().clear_filter();
                Some(render(&self.app))
            }
            Command::Export { target, format, path } => {
                self.export(target, format, &path)?;
                Some(format!("Exporté vers {}", path.display()))
            }
            Command::Wait { ms } => {
                let delta = Duration::from_millis(ms);
                self.skipped += delta;
                self.app.advance_by(delta);
                None
            }
            Command::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(text))
    }

    fn set_database_field(&mut self, field: DatabaseField, value: String) {
        let form = self.app.database_mut().form_mut();
        match field {
            DatabaseField::Host => form.host = value,
            DatabaseField::Port => form.port = value,
            DatabaseField::Database => form.database = value,
            DatabaseField::Username => form.username = value,
            DatabaseField::Password => form.password = value,
        }
    }

    fn set_review_field(&mut self, field: ReviewField, value: String) -> Result<()> {
        let form = self.app.reviews_mut().form_mut();
        match field {
            ReviewField::Author => form.author = value,
            ReviewField::Title => form.title = value,
            ReviewField::Comment => form.comment = value,
            ReviewField::Rating => {
                form.rating = value
                    .parse()
                    .map_err(|_| PlatformError::Validation(format!("Invalid rating: {value}")))?;
            }
            ReviewField::Language => form.language = value.parse()?,
            ReviewField::Category => form.category = value.parse()?,
        }
        Ok(())
    }

    fn set_filter_field(&mut self, field: FilterField, value: &str) -> Result<()> {
        let filter = self.app.reviews_mut().filter_mut();
        match field {
            FilterField::Rating => {
                filter.rating = Some(
                    value
                        .parse()
                        .map_err(|_| PlatformError::Validation(format!("Invalid rating: {value}")))?,
                );
            }
            FilterField::Category => filter.category = Some(value.parse::<ReviewCategory>()?),
            FilterField::Language => filter.language = Some(value.parse::<Language>()?),
        }
        Ok(())
    }

    fn export(&self, target: ExportTarget, format: OutputFormat, path: &Path) -> Result<()> {
        match target {
            ExportTarget::Chat => write_transcript(self.app.chat().messages(), format, path)?,
            ExportTarget::Queries => write_query_history(self.app.database().history(), format, path)?,
            ExportTarget::Reviews => write_reviews(self.app.reviews().reviews(), format, path)?,
        }
        info!(?target, path = %path.display(), "Exported");
        Ok(())
    }

    /// Run every line of `script`, writing command output to `out`.
    ///
    /// A failing command is reported and the script carries on. The app is
    /// shut down at the end.
    pub fn run_script<W: Write>(&mut self, script: &str, out: &mut W) -> io::Result<()> {
        for (number, line) in script.lines().enumerate() {
            match self.execute_line(line) {
                Ok(Flow::Continue(Some(text))) => writeln!(out, "{text}")?,
                Ok(Flow::Continue(None)) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    warn!(line = number + 1, error = %err, "Script command failed");
                    writeln!(out, "ligne {}: {err}", number + 1)?;
                }
            }
        }
        self.app.shutdown();
        Ok(())
    }

    /// Bring the virtual clock up to `elapsed` real time plus skipped time
    fn sync(&mut self, elapsed: Duration) {
        self.app.advance_to(elapsed + self.skipped);
    }

    fn real_deadline(&self, origin: Instant) -> Option<Instant> {
        self.app
            .next_deadline()
            .map(|due| origin + due.saturating_sub(self.skipped))
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Interactive shell on stdin/stdout
pub async fn run_shell(mut console: Console) -> io::Result<()> {
    let origin = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stage = console.app().stage();
    println!("{}", render(console.app()));

    loop {
        let deadline = console.real_deadline(origin);
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                console.sync(origin.elapsed());
                match console.execute_line(&line) {
                    Ok(Flow::Continue(Some(text))) => println!("{text}"),
                    Ok(Flow::Continue(None)) => {}
                    Ok(Flow::Quit) => break,
                    Err(err) => println!("erreur: {err}"),
                }
            }
            () = sleep_until_some(deadline) => {
                console.sync(origin.elapsed());
            }
        }

        let current = console.app().stage();
        if current != stage && current != Stage::Main {
            println!("{}", render(console.app()));
        }
        stage = current;
    }

    console.app_mut().shutdown();
    info!("Shell closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse_line(line).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("tab chat"), Command::Tab { tab: Tab::Chat });
        assert_eq!(
            parse("send  Bonjour à tous "),
            Command::Send {
                words: vec!["Bonjour".into(), "à".into(), "tous".into()]
            }
        );
        assert_eq!(
            parse("db-set database ma base"),
            Command::DbSet {
                field: DatabaseField::Database,
                value: vec!["ma".into(), "base".into()]
            }
        );
        assert_eq!(parse("wait 250"), Command::Wait { ms: 250 });
        assert_eq!(
            parse("export reviews csv out/avis.csv"),
            Command::Export {
                target: ExportTarget::Reviews,
                format: OutputFormat::Csv,
                path: PathBuf::from("out/avis.csv"),
            }
        );
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse("send"), Command::Send { words: Vec::new() });
        assert_eq!(
            parse("query SELECT -1"),
            Command::Query {
                sql: vec!["SELECT".into(), "-1".into()]
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        for line in [
            "dance",
            "tab",
            "tab kitchen",
            "like",
            "remove abc",
            "db-set host",
            "db-set colour red",
            "export chat pdf x",
            "upload",
        ] {
            assert!(Command::parse_line(line).is_err(), "{line}");
        }
    }

    #[test]
    fn test_help_lists_every_command() {
        let text = help();
        for name in ["review-submit", "db-set", "filter-clear", "export", "wait"] {
            assert!(text.contains(name), "{name}");
        }
    }

    #[test]
    fn test_declared_field_is_set() {
        let config = crate::config::AppConfig::default();
        let app = App::new(&config, std::sync::Arc::new(crate::notify::RecordingNotifier::new()));
        let mut console = Console::new(app, config.upload.max_file_size_bytes);
        console.set_database_field(DatabaseField::Host, "db.local".into());
        assert_eq!(console.app().database().form().host, "db.local");
    }
}
