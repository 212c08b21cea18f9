//! Simulated multilingual chat
//!
//! The log is append-only. Every send appends the user message at once, then
//! one assistant reply after a fixed "thinking" delay; while a reply is
//! pending the session refuses further input.

use chrono::Local;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::config::ChatConfig;
use crate::error::{PlatformError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{Language, Message, Sender};
use crate::notify::{Notification, SharedNotifier};
use crate::scheduler::{Simulated, Timers};
use crate::validation::InputValidator;

/// First message of every session
pub const GREETING: &str = "Bonjour ! Je suis votre assistant IA local. Je peux analyser vos documents uploadés et répondre à vos questions en français, wolof, anglais ou espagnol. Comment puis-je vous aider ?";

/// Live values a reply may mention, captured when the user sends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyContext {
    pub file_count: usize,
    pub database_connected: bool,
}

/// Which canned reply a message maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCategory {
    Greeting,
    Help,
    Files,
    Database,
    Fallback,
}

/// Produces the assistant's answer to one user message
#[cfg_attr(test, mockall::automock)]
pub trait ReplySelector: Send {
    fn reply(&self, text: &str, language: Language, context: &ReplyContext) -> String;
}

/// Canned replies for one language
#[derive(Debug, Clone, Copy)]
pub struct CannedReplies {
    pub greeting: &'static str,
    pub help: &'static str,
    /// `{count}` is replaced by the number of uploaded files
    pub files: &'static str,
    pub database_connected: &'static str,
    pub database_disconnected: &'static str,
    pub fallback: &'static str,
}

impl CannedReplies {
    fn render(&self, category: ReplyCategory, context: &ReplyContext) -> String {
        match category {
            ReplyCategory::Greeting => self.greeting.to_string(),
            ReplyCategory::Help => self.help.to_string(),
            ReplyCategory::Files => self.files.replace("{count}", &context.file_count.to_string()),
            ReplyCategory::Database if context.database_connected => {
                self.database_connected.to_string()
            }
            ReplyCategory::Database => self.database_disconnected.to_string(),
            ReplyCategory::Fallback => self.fallback.to_string(),
        }
    }
}

/// Reply tables shipped with the application
pub fn default_replies() -> HashMap<Language, CannedReplies> {
    HashMap::from([
        (
            Language::Fr,
            CannedReplies {
                greeting: "Bonjour ! Comment puis-je vous aider avec vos documents ?",
                help: "Je peux analyser vos fichiers PDF/Word et répondre à vos questions basées sur leur contenu.",
                files: "J'ai accès à {count} document(s) uploadé(s). Posez-moi une question sur leur contenu !",
                database_connected: "La base de données est connectée. Je peux analyser vos données.",
                database_disconnected: "Aucune base de données connectée pour le moment.",
                fallback: "Je comprends votre question. Basé sur vos documents, voici ma réponse...",
            },
        ),
        (
            Language::Wo,
            CannedReplies {
                greeting: "Asalaam aleekum! Naka nga def ak sa documents yi?",
                help: "Man naa ko defar sa fichiers PDF/Word yi te tontu sa lakk yi.",
                files: "Am naa {count} fichier(s) yu uploadé. Lakk ma ci seen contenu!",
                database_connected: "Database bi connecté na. Man naa ko analyser sa données yi.",
                database_disconnected: "Amul database bu connecté.",
                fallback: "Degoon naa sa lakk. Ci sa documents yi, men naa ko tontu...",
            },
        ),
        (
            Language::En,
            CannedReplies {
                greeting: "Hello! How can I help you with your documents?",
                help: "I can analyze your PDF/Word files and answer questions based on their content.",
                files: "I have access to {count} uploaded document(s). Ask me anything about their content!",
                database_connected: "Database is connected. I can analyze your data.",
                database_disconnected: "No database connected at the moment.",
                fallback: "I understand your question. Based on your documents, here's my response...",
            },
        ),
        (
            Language::Es,
            CannedReplies {
                greeting: "¡Hola! ¿Cómo puedo ayudarte con tus documentos?",
                help: "Puedo analizar tus archivos PDF/Word y responder preguntas basadas en su contenido.",
                files: "Tengo acceso a {count} documento(s) subido(s). ¡Pregúntame sobre su contenido!",
                database_connected: "La base de datos está conectada. Puedo analizar tus datos.",
                database_disconnected: "No hay base de datos conectada por el momento.",
                fallback: "Entiendo tu pregunta. Basado en tus documentos, aquí está mi respuesta...",
            },
        ),
    ])
}

/// Picks a canned reply by keyword substring, first matching group wins
pub struct KeywordReplySelector {
    groups: Vec<(ReplyCategory, Vec<String>)>,
    replies: HashMap<Language, CannedReplies>,
    default_language: Language,
}

impl KeywordReplySelector {
    pub fn new(replies: HashMap<Language, CannedReplies>, default_language: Language) -> Self {
        let groups = [
            (ReplyCategory::Greeting, ["bonjour", "hello"]),
            (ReplyCategory::Help, ["aide", "help"]),
            (ReplyCategory::Files, ["fichier", "document"]),
            (ReplyCategory::Database, ["database", "base"]),
        ]
        .into_iter()
        .map(|(category, words)| (category, words.iter().map(ToString::to_string).collect()))
        .collect();

        Self {
            groups,
            replies,
            default_language,
        }
    }

    /// Category for `text`, matched case-insensitively
    pub fn classify(&self, text: &str) -> ReplyCategory {
        let normalized: String = text.nfc().collect::<String>().to_lowercase();
        self.groups
            .iter()
            .find(|(_, words)| words.iter().any(|w| normalized.contains(w.as_str())))
            .map_or(ReplyCategory::Fallback, |(category, _)| *category)
    }
}

impl Default for KeywordReplySelector {
    fn default() -> Self {
        Self::new(default_replies(), Language::Fr)
    }
}

impl ReplySelector for KeywordReplySelector {
    fn reply(&self, text: &str, language: Language, context: &ReplyContext) -> String {
        let category = self.classify(text);
        let table = self
            .replies
            .get(&language)
            .or_else(|| self.replies.get(&self.default_language));
        debug!(?category, language = %language, "Selected reply");
        table.map_or_else(String::new, |t| t.render(category, context))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatEvent {
    Reply,
}

struct PendingReply {
    text: String,
    language: Language,
}

/// The chat log and its input state
pub struct ChatSession {
    messages: Vec<Message>,
    input: String,
    language: Language,
    pending: Option<PendingReply>,
    voice_listening: bool,
    next_id: u64,
    settings: ChatConfig,
    selector: Box<dyn ReplySelector>,
    notifier: SharedNotifier,
    timers: Timers<ChatEvent>,
    metrics: MetricsCollector,
}

impl ChatSession {
    pub fn new(settings: ChatConfig, notifier: SharedNotifier) -> Self {
        let selector = KeywordReplySelector::new(default_replies(), settings.language());
        Self::with_selector(settings, notifier, Box::new(selector))
    }

    pub fn with_selector(
        settings: ChatConfig,
        notifier: SharedNotifier,
        selector: Box<dyn ReplySelector>,
    ) -> Self {
        let language = settings.language();
        let mut session = Self {
            messages: Vec::new(),
            input: String::new(),
            language,
            pending: None,
            voice_listening: false,
            next_id: 1,
            settings,
            selector,
            notifier,
            timers: Timers::new(),
            metrics: MetricsCollector::default(),
        };
        session.append(GREETING.to_string(), Sender::Assistant, Some(Language::Fr));
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Language of the next reply; past messages are untouched
    pub fn select_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Whether a reply is on its way; input is disabled meanwhile
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn is_listening(&self) -> bool {
        self.voice_listening
    }

    /// Flip voice input; speech recognition is not available yet
    pub fn toggle_voice(&mut self) -> bool {
        self.voice_listening = !self.voice_listening;
        if self.voice_listening {
            self.notifier.notify(Notification::info(
                "Reconnaissance vocale",
                "Fonction en développement - Utilisez le clavier pour le moment",
            ));
        }
        self.voice_listening
    }

    /// Send the current input. The reply is chosen now, with `context` as it
    /// stands, and appended once the reply delay elapses.
    pub fn send(&mut self, context: ReplyContext) -> Result<&Message> {
        if self.is_pending() {
            return Err(PlatformError::InvalidState(
                "a reply is already pending".into(),
            ));
        }
        let text = InputValidator::sanitize_text(&self.input);
        if let Err(err) = InputValidator::validate_required("message", &text) {
            self.notifier.notify(Notification::destructive(
                "Message vide",
                "Veuillez saisir un message",
            ));
            return Err(err);
        }

        self.input.clear();
        let reply = self.selector.reply(&text, self.language, &context);
        self.pending = Some(PendingReply {
            text: reply,
            language: self.language,
        });
        self.timers
            .schedule(self.settings.reply_delay(), ChatEvent::Reply);
        info!(language = %self.language, chars = text.chars().count(), "User message sent");

        let language = self.language;
        Ok(self.append(text, Sender::User, Some(language)))
    }

    fn append(&mut self, text: String, sender: Sender, language: Option<Language>) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id: id.to_string(),
            text,
            sender,
            timestamp: Local::now(),
            language,
        });
        &self.messages[self.messages.len() - 1]
    }

    fn handle(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Reply => {
                let Some(pending) = self.pending.take() else {
                    return;
                };
                self.metrics
                    .record_chat_turn(pending.language.code(), self.settings.reply_delay());
                debug!(language = %pending.language, "Assistant replied");
                self.append(pending.text, Sender::Assistant, Some(pending.language));
            }
        }
    }
}

impl Simulated for ChatSession {
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
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use std::sync::Arc;

    fn settings() -> ChatConfig {
        crate::config::AppConfig::default().chat
    }

    #[test]
    fn test_keyword_priority() {
        let selector = KeywordReplySelector::default();
        assert_eq!(selector.classify("HELLO, besoin d'aide"), ReplyCategory::Greeting);
        assert_eq!(selector.classify("aide avec la base"), ReplyCategory::Help);
        assert_eq!(selector.classify("Mes documents"), ReplyCategory::Files);
        assert_eq!(selector.classify("ma database"), ReplyCategory::Database);
        assert_eq!(selector.classify("quoi de neuf"), ReplyCategory::Fallback);
    }

    #[test]
    fn test_files_reply_uses_count() {
        let selector = KeywordReplySelector::default();
        let context = ReplyContext {
            file_count: 3,
            database_connected: false,
        };
        assert_eq!(
            selector.reply("document?", Language::En, &context),
            "I have access to 3 uploaded document(s). Ask me anything about their content!"
        );
        assert_eq!(
            selector.reply("base", Language::En, &context),
            "No database connected at the moment."
        );
    }

    #[test]
    fn test_missing_language_falls_back_to_default() {
        let mut replies = default_replies();
        replies.remove(&Language::Es);
        let selector = KeywordReplySelector::new(replies, Language::Fr);
        assert_eq!(
            selector.reply("hello", Language::Es, &ReplyContext::default()),
            "Bonjour ! Comment puis-je vous aider avec vos documents ?"
        );
    }

    #[test]
    fn test_selector_receives_send_time_context() {
        let mut selector = MockReplySelector::new();
        selector
            .expect_reply()
            .withf(|text, language, context| {
                text.to_string() == "salut" && *language == Language::Wo && context.file_count == 2
            })
            .times(1)
            .return_const("ok".to_string());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut chat = ChatSession::with_selector(settings(), notifier, Box::new(selector));
        chat.select_language(Language::Wo);
        chat.set_input("  salut ");
        chat.send(ReplyContext {
            file_count: 2,
            database_connected: true,
        })
        .unwrap();
        chat.advance_to(Duration::from_millis(1500));
        assert_eq!(chat.messages().last().unwrap().text, "ok");
    }

    #[test]
    fn test_send_rejected_while_pending() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut chat = ChatSession::new(settings(), notifier);
        chat.set_input("bonjour");
        chat.send(ReplyContext::default()).unwrap();
        assert!(chat.is_pending());
        chat.set_input("encore");
        assert!(chat.send(ReplyContext::default()).is_err());
        assert_eq!(chat.input(), "encore");
        chat.advance_to(Duration::from_millis(1499));
        assert_eq!(chat.messages().len(), 2);
        chat.advance_to(Duration::from_millis(1500));
        assert_eq!(chat.messages().len(), 3);
        assert!(!chat.is_pending());
    }

    #[test]
    fn test_voice_toggle_notifies_on_enable_only() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut chat = ChatSession::new(settings(), notifier.clone());
        assert!(chat.toggle_voice());
        assert!(!chat.toggle_voice());
        assert_eq!(notifier.all().len(), 1);
    }
}
