//! Data models shared by the sessions
//!
//! Messages, uploaded-file records, database settings, query results and
//! reviews, plus the small closed enums they are built from.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlatformError;

/// Languages the assistant answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French
    Fr,
    /// Wolof
    Wo,
    /// English
    En,
    /// Spanish
    Es,
}

impl Language {
    /// Every supported language, in selector order
    pub const ALL: [Self; 4] = [Self::Fr, Self::Wo, Self::En, Self::Es];

    /// Two-letter code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::Wo => "wo",
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Display name in the language itself
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fr => "Français",
            Self::Wo => "Wolof",
            Self::En => "English",
            Self::Es => "Español",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" => Ok(Self::Fr),
            "wo" => Ok(Self::Wo),
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(PlatformError::Validation(format!("Unknown language: {other}"))),
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing
    User,
    /// The simulated assistant
    Assistant,
}

/// A chat message. Immutable once appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique id within the session
    pub id: String,
    /// Message text
    pub text: String,
    /// Who wrote it
    pub sender: Sender,
    /// Creation time
    pub timestamp: DateTime<Local>,
    /// Language selected when the message was created
    pub language: Option<Language>,
}

/// A candidate file offered for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// File name as shown to the user
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Declared size in bytes
    pub size: u64,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl FileHandle {
    /// Build a handle whose declared size is the length of `bytes`
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Build a handle with a declared size and no content, for files that
    /// are not worth reading
    pub fn declared(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            bytes: Vec::new(),
        }
    }

    /// Size in mebibytes, for display
    #[must_use]
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// Identifier of an uploaded-file record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ingestion status of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Transfer in progress
    Uploading,
    /// Text extraction in progress
    Processing,
    /// Extracted text available
    Ready,
    /// Extraction failed
    Error,
}

impl FileStatus {
    /// Whether the pipeline is finished for this file
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    /// Position in the pipeline; used to check transitions never regress
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Uploading => 0,
            Self::Processing => 1,
            Self::Ready | Self::Error => 2,
        }
    }

    /// Status line shown next to the file
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uploading => "Upload en cours...",
            Self::Processing => "Traitement IA...",
            Self::Ready => "Prêt",
            Self::Error => "Erreur",
        }
    }
}

/// An accepted file and its ingestion state
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Record id, distinct even for duplicate files
    pub id: FileId,
    /// The accepted file
    pub file: FileHandle,
    /// Current status
    pub status: FileStatus,
    /// Transfer progress, 0 to 100
    pub progress: u8,
    /// Text produced by extraction
    pub extracted_text: Option<String>,
    /// Failure message when status is `Error`
    pub error: Option<String>,
}

/// Database engines offered by the connection form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// MySQL
    Mysql,
    /// PostgreSQL
    Postgresql,
    /// SQLite
    Sqlite,
    /// MongoDB
    Mongodb,
}

impl DatabaseKind {
    /// Port filled in when this kind is selected
    #[must_use]
    pub const fn default_port(&self) -> &'static str {
        match self {
            Self::Mysql => "3306",
            Self::Postgresql => "5432",
            Self::Sqlite => "",
            Self::Mongodb => "27017",
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Mysql => "MySQL",
            Self::Postgresql => "PostgreSQL",
            Self::Sqlite => "SQLite",
            Self::Mongodb => "MongoDB",
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Self::Mysql),
            "postgresql" | "postgres" => Ok(Self::Postgresql),
            "sqlite" => Ok(Self::Sqlite),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            other => Err(PlatformError::Validation(format!(
                "Unknown database kind: {other}"
            ))),
        }
    }
}

/// Connection settings held by the database form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Engine
    pub kind: DatabaseKind,
    /// Host name
    pub host: String,
    /// Port, empty for file databases
    pub port: String,
    /// Database name (required)
    pub database: String,
    /// User name (required)
    pub username: String,
    /// Password
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Mysql,
            host: "localhost".to_string(),
            port: DatabaseKind::Mysql.default_port().to_string(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// One row of a canned query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Row id
    pub id: u32,
    /// User name
    pub name: String,
    /// User email
    pub email: String,
    /// Creation date, `YYYY-MM-DD`
    pub created_at: String,
}

/// A simulated query execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Query text as typed
    pub query: String,
    /// Returned rows
    pub rows: Vec<ResultRow>,
    /// Execution time
    pub timestamp: DateTime<Local>,
}

/// Topic of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewCategory {
    /// User interface
    Ui,
    /// AI quality
    Ai,
    /// Speed
    Performance,
    /// Feature set
    Features,
    /// Anything else
    General,
}

impl ReviewCategory {
    /// Every category, in selector order
    pub const ALL: [Self; 5] = [
        Self::General,
        Self::Ai,
        Self::Ui,
        Self::Performance,
        Self::Features,
    ];

    /// Display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::General => "Général",
            Self::Ai => "IA",
            Self::Ui => "Interface",
            Self::Performance => "Performance",
            Self::Features => "Fonctionnalités",
        }
    }
}

impl FromStr for ReviewCategory {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ui" => Ok(Self::Ui),
            "ai" => Ok(Self::Ai),
            "performance" => Ok(Self::Performance),
            "features" => Ok(Self::Features),
            "general" => Ok(Self::General),
            other => Err(PlatformError::Validation(format!(
                "Unknown review category: {other}"
            ))),
        }
    }
}

/// A published review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique id
    pub id: String,
    /// Author name
    pub author: String,
    /// Rating from 1 to 5
    pub rating: u8,
    /// Short title
    pub title: String,
    /// Body text
    pub comment: String,
    /// Publication date
    pub date: DateTime<Local>,
    /// Thumbs up
    pub like_count: u64,
    /// Thumbs down
    pub dislike_count: u64,
    /// Language the review is written in
    pub language: Language,
    /// Topic
    pub category: ReviewCategory,
}

/// The review submission form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Author name (required)
    pub author: String,
    /// Rating, defaults to 5
    pub rating: u8,
    /// Title (required)
    pub title: String,
    /// Comment (required)
    pub comment: String,
    /// Language, defaults to French
    pub language: Language,
    /// Category, defaults to general
    pub category: ReviewCategory,
}

impl Default for ReviewDraft {
    fn default() -> Self {
        Self {
            author: String::new(),
            rating: 5,
            title: String::new(),
            comment: String::new(),
            language: Language::Fr,
            category: ReviewCategory::General,
        }
    }
}

/// Conjunctive filter over reviews; unset fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Exact rating
    pub rating: Option<u8>,
    /// Exact category
    pub category: Option<ReviewCategory>,
    /// Exact language
    pub language: Option<Language>,
}

impl ReviewFilter {
    /// Whether `review` passes every set field
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.rating.map_or(true, |r| review.rating == r)
            && self.category.map_or(true, |c| review.category == c)
            && self.language.map_or(true, |l| review.language == l)
    }

    /// Whether no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rating.is_none() && self.category.is_none() && self.language.is_none()
    }
}

/// Output format for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(PlatformError::Validation(format!(
                "Invalid format: {other}. Must be one of txt, csv, json"
            ))),
        }
    }
}
