//! Simulated document ingestion
//!
//! Accepted files go through `uploading → processing → ready | error` on
//! their own timers. Files never wait on each other; a removed file has its
//! pending timers cancelled with it.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::UploadConfig;
use crate::error::{PlatformError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{FileHandle, FileId, FileStatus, UploadedFile};
use crate::notify::{Notification, SharedNotifier};
use crate::router::ShellEvent;
use crate::scheduler::{Simulated, Timers};
use crate::validation::InputValidator;

/// Turns an accepted file into text
#[cfg_attr(test, mockall::automock)]
pub trait TextExtractor: Send {
    fn extract(&self, file: &FileHandle) -> Result<String>;
}

/// Reads plain text literally and stands in a placeholder for everything else.
///
/// Invalid UTF-8 sequences decode to U+FFFD rather than failing the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderExtractor;

impl TextExtractor for PlaceholderExtractor {
    fn extract(&self, file: &FileHandle) -> Result<String> {
        if file.mime_type == "text/plain" {
            Ok(String::from_utf8_lossy(&file.bytes).into_owned())
        } else {
            Ok(format!("Contenu extrait de {}", file.name))
        }
    }
}

/// Outcome of offering a batch of files
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records created for accepted files, in batch order
    pub accepted: Vec<FileId>,
    /// Rejected file names with the reason
    pub rejected: Vec<(String, PlatformError)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadEvent {
    Step(FileId),
    Processed(FileId),
}

impl UploadEvent {
    const fn file_id(&self) -> FileId {
        match self {
            Self::Step(id) | Self::Processed(id) => *id,
        }
    }
}

/// The uploaded-file collection and its pipelines
pub struct UploadSession {
    files: Vec<UploadedFile>,
    next_id: u64,
    config: UploadConfig,
    extractor: Box<dyn TextExtractor>,
    notifier: SharedNotifier,
    timers: Timers<UploadEvent>,
    outbox: Vec<ShellEvent>,
    metrics: MetricsCollector,
}

impl UploadSession {
    /// Empty collection using the placeholder extractor
    pub fn new(config: UploadConfig, notifier: SharedNotifier) -> Self {
        Self::with_extractor(config, notifier, Box::new(PlaceholderExtractor))
    }

    /// Empty collection with a custom extractor
    pub fn with_extractor(
        config: UploadConfig,
        notifier: SharedNotifier,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            files: Vec::new(),
            next_id: 1,
            config,
            extractor,
            notifier,
            timers: Timers::new(),
            outbox: Vec::new(),
            metrics: MetricsCollector::default(),
        }
    }

    /// Every record, in upload order
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Record for `id`, if it was not removed
    pub fn get(&self, id: FileId) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Files that reached `Ready`
    pub fn ready_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Ready)
            .count()
    }

    /// Drain the events raised for the shell since the last call
    pub fn take_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Validate a batch and start a pipeline for every accepted file
    pub fn accept_batch(&mut self, batch: Vec<FileHandle>) -> BatchReport {
        self.offer(batch.into_iter().map(Ok))
    }

    /// Like [`accept_batch`](Self::accept_batch), for files that may have
    /// failed to load. Each failure is rejected on its own; the rest of the
    /// batch is still accepted.
    pub fn offer(&mut self, batch: impl IntoIterator<Item = Result<FileHandle>>) -> BatchReport {
        let mut report = BatchReport::default();
        let limit = self.config.max_file_size_bytes;

        for offered in batch {
            let checked = offered.and_then(|file| {
                InputValidator::validate_file(&file, limit)?;
                Ok(file)
            });
            let file = match checked {
                Ok(file) => file,
                Err(err) => {
                    let name = err.file_name().unwrap_or_default().to_string();
                    warn!(file = %name, error = %err, "Rejected file");
                    self.notifier.notify(rejection_notice(&err));
                    report.rejected.push((name, err));
                    continue;
                }
            };

            let id = FileId(self.next_id);
            self.next_id += 1;
            info!(file_id = %id, file = %file.name, size = file.size, "Upload started");
            self.files.push(UploadedFile {
                id,
                file,
                status: FileStatus::Uploading,
                progress: 0,
                extracted_text: None,
                error: None,
            });
            self.timers
                .schedule(self.config.step_delay(), UploadEvent::Step(id));
            report.accepted.push(id);
        }

        self.metrics
            .record_upload_batch(report.accepted.len(), report.rejected.len());
        if !report.accepted.is_empty() {
            self.files_changed();
        }
        report
    }

    /// Delete a record, cancelling whatever is still pending for it
    pub fn remove(&mut self, id: FileId) -> Result<UploadedFile> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| PlatformError::NotFound(format!("file {id}")))?;

        let cancelled = self.timers.cancel_where(|event| event.file_id() == id);
        let removed = self.files.remove(index);
        info!(file_id = %id, file = %removed.file.name, cancelled, "File removed");
        self.files_changed();
        Ok(removed)
    }

    fn files_changed(&mut self) {
        let count = self.files.len();
        self.metrics.set_file_count(count);
        self.outbox.push(ShellEvent::FilesChanged { count });
    }

    fn handle(&mut self, event: UploadEvent) {
        let id = event.file_id();
        let Some(index) = self.files.iter().position(|f| f.id == id) else {
            return;
        };

        match event {
            UploadEvent::Step(_) => {
                let record = &mut self.files[index];
                if record.status != FileStatus::Uploading {
                    return;
                }
                record.progress = record
                    .progress
                    .saturating_add(self.config.progress_step)
                    .min(100);
                debug!(file_id = %id, progress = record.progress, "Upload progress");

                if record.progress >= 100 {
                    record.status = FileStatus::Processing;
                    debug!(file_id = %id, status = ?record.status, "Upload transferred");
                    self.timers
                        .schedule(self.config.processing_delay(), UploadEvent::Processed(id));
                } else {
                    self.timers
                        .schedule(self.config.step_delay(), UploadEvent::Step(id));
                }
            }
            UploadEvent::Processed(_) => {
                if self.files[index].status != FileStatus::Processing {
                    return;
                }
                let outcome = self.extractor.extract(&self.files[index].file);
                let record = &mut self.files[index];
                match outcome {
                    Ok(text) => {
                        record.status = FileStatus::Ready;
                        record.extracted_text = Some(text);
                        info!(file_id = %id, file = %record.file.name, "File ready");
                        self.notifier.notify(Notification::success(
                            "Fichier traité",
                            format!("{} est prêt pour l'analyse IA", record.file.name),
                        ));
                        self.metrics.record_file_completed(true);
                    }
                    Err(err) => {
                        record.status = FileStatus::Error;
                        record.error = Some("Erreur lors du traitement".to_string());
                        warn!(file_id = %id, file = %record.file.name, error = %err, "Extraction failed");
                        self.notifier.notify(Notification::destructive(
                            "Erreur",
                            format!("Impossible de traiter {}", record.file.name),
                        ));
                        self.metrics.record_file_completed(false);
                    }
                }
            }
        }
    }
}

fn rejection_notice(err: &PlatformError) -> Notification {
    match err {
        PlatformError::FileTooLarge { name, .. } => Notification::destructive(
            "Fichier trop volumineux",
            format!("{name} dépasse la limite de 10MB"),
        ),
        PlatformError::UnsupportedFileType { name, .. } => Notification::destructive(
            "Fichier non supporté",
            format!("{name} n'est pas un format supporté"),
        ),
        PlatformError::Unreadable { name, .. } => Notification::destructive(
            "Fichier illisible",
            format!("Impossible de lire {name}"),
        ),
        other => Notification::destructive("Fichier refusé", other.to_string()),
    }
}

impl Simulated for UploadSession {
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
