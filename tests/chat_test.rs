//! Integration tests for the chat session

use plateforme_ia::chat::{ChatSession, ReplyContext, GREETING};
use plateforme_ia::config::AppConfig;
use plateforme_ia::models::{Language, Sender};
use plateforme_ia::notify::{RecordingNotifier, Severity};
use plateforme_ia::scheduler::Simulated;
use std::sync::Arc;
use std::time::Duration;

const REPLY_DELAY: Duration = Duration::from_millis(1500);

fn chat() -> ChatSession {
    ChatSession::new(AppConfig::default().chat, Arc::new(RecordingNotifier::new()))
}

/// Send `text` and wait out the reply; `clock` tracks virtual time across calls
fn exchange(chat: &mut ChatSession, clock: &mut Duration, text: &str, context: ReplyContext) -> String {
    chat.set_input(text);
    chat.send(context).unwrap();
    *clock += REPLY_DELAY;
    chat.advance_to(*clock);
    chat.messages().last().unwrap().text.clone()
}

#[test]
fn test_log_starts_with_greeting() {
    let chat = chat();
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].text, GREETING);
    assert_eq!(chat.messages()[0].sender, Sender::Assistant);
}

#[test]
fn test_bonjour_in_french() {
    let mut chat = chat();
    chat.set_input("bonjour");
    let sent = chat.send(ReplyContext::default()).unwrap();
    assert_eq!(sent.sender, Sender::User);
    assert_eq!(sent.language, Some(Language::Fr));

    chat.advance_to(REPLY_DELAY);
    let assistant: Vec<_> = chat.messages()[2..].iter().collect();
    assert_eq!(assistant.len(), 1);
    assert_eq!(assistant[0].sender, Sender::Assistant);
    assert_eq!(
        assistant[0].text,
        "Bonjour ! Comment puis-je vous aider avec vos documents ?"
    );
}

#[test]
fn test_reply_follows_selected_language() {
    let mut chat = chat();
    let mut clock = Duration::ZERO;
    chat.select_language(Language::Es);
    assert_eq!(
        exchange(&mut chat, &mut clock, "HELP me", ReplyContext::default()),
        "Puedo analizar tus archivos PDF/Word y responder preguntas basadas en su contenido."
    );
    chat.select_language(Language::Wo);
    assert_eq!(
        exchange(&mut chat, &mut clock, "ndax database bi", ReplyContext { file_count: 0, database_connected: true }),
        "Database bi connecté na. Man naa ko analyser sa données yi."
    );
    // earlier messages keep their language
    assert_eq!(chat.messages()[1].language, Some(Language::Es));
}

#[test]
fn test_document_reply_counts_files_at_send_time() {
    let mut chat = chat();
    let mut clock = Duration::ZERO;
    let reply = exchange(
        &mut chat,
        &mut clock,
        "Que disent mes fichiers ?",
        ReplyContext { file_count: 4, database_connected: false },
    );
    assert_eq!(
        reply,
        "J'ai accès à 4 document(s) uploadé(s). Posez-moi une question sur leur contenu !"
    );
}

#[test]
fn test_fallback_reply() {
    let mut chat = chat();
    let mut clock = Duration::ZERO;
    chat.select_language(Language::En);
    assert_eq!(
        exchange(&mut chat, &mut clock, "what is the weather", ReplyContext::default()),
        "I understand your question. Based on your documents, here's my response..."
    );
}

#[test]
fn test_blank_input_is_rejected_without_mutation() {
    let notifier = Arc::new(RecordingNotifier::new());
    let mut chat = ChatSession::new(AppConfig::default().chat, notifier.clone());
    chat.set_input("   ");
    assert!(chat.send(ReplyContext::default()).is_err());
    assert_eq!(chat.messages().len(), 1);
    assert!(!chat.is_pending());

    let notices = notifier.all();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Message vide");
    assert_eq!(notices[0].severity, Severity::Destructive);
}

#[test]
fn test_teardown_drops_pending_reply() {
    let mut chat = chat();
    chat.set_input("bonjour");
    chat.send(ReplyContext::default()).unwrap();
    chat.teardown();
    chat.advance_to(Duration::from_secs(10));
    assert_eq!(chat.messages().len(), 2);
    assert!(!chat.is_pending());
}
