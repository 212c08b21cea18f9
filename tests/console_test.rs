//! Integration tests for console commands and scripts

use plateforme_ia::app::{App, Strategies};
use plateforme_ia::config::AppConfig;
use plateforme_ia::console::{load_file, Console, Flow};
use plateforme_ia::database::FixedOutcome;
use plateforme_ia::error::PlatformError;
use plateforme_ia::models::FileStatus;
use plateforme_ia::notify::RecordingNotifier;
use plateforme_ia::onboarding::Stage;
use plateforme_ia::router::Tab;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn console() -> (Console, Arc<RecordingNotifier>) {
    let config = AppConfig::default();
    let notifier = Arc::new(RecordingNotifier::new());
    let mut strategies = Strategies::from_config(&config, None);
    strategies.outcome = Box::new(FixedOutcome(true));
    let app = App::with_strategies(&config, notifier.clone(), strategies);
    (Console::new(app, config.upload.max_file_size_bytes), notifier)
}

fn run(console: &mut Console, script: &str) -> String {
    let mut out = Vec::new();
    console.run_script(script, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_load_file_guesses_type() {
    let dir = tempdir().unwrap();
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "hello").unwrap();
    let handle = load_file(&txt, 1024).unwrap();
    assert_eq!(handle.name, "notes.txt");
    assert_eq!(handle.mime_type, "text/plain");
    assert_eq!(handle.bytes, b"hello");

    let docx = dir.path().join("cv.docx");
    fs::write(&docx, [0u8; 8]).unwrap();
    assert_eq!(
        load_file(&docx, 1024).unwrap().mime_type,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
}

#[test]
fn test_load_file_skips_content_of_oversized_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.pdf");
    fs::write(&path, vec![0u8; 64]).unwrap();
    let handle = load_file(&path, 16).unwrap();
    assert_eq!(handle.size, 64);
    assert!(handle.bytes.is_empty());
    let err = load_file(&dir.path().join("absent.pdf"), 16).unwrap_err();
    assert!(matches!(err, PlatformError::Unreadable { ref name, .. } if name == "absent.pdf"));
}

#[test]
fn test_script_walks_through_the_app() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("hello.txt");
    fs::write(&notes, "hello").unwrap();
    let export = dir.path().join("chat.json");

    let script = format!(
        "# onboarding\n\
         wait 3000\n\
         start\n\
         tab upload\n\
         upload {}\n\
         wait 3000\n\
         tab chat\n\
         lang en\n\
         send any document?\n\
         wait 1500\n\
         export chat json {}\n",
        notes.display(),
        export.display()
    );
    let (mut console, _) = console();
    let output = run(&mut console, &script);

    let app = console.app();
    assert_eq!(app.stage(), Stage::Main);
    assert_eq!(app.active_tab(), Tab::Chat);
    assert_eq!(app.uploads().files()[0].status, FileStatus::Ready);
    assert_eq!(
        app.chat().messages().last().unwrap().text,
        "I have access to 1 uploaded document(s). Ask me anything about their content!"
    );
    assert!(app.is_shut_down());
    assert!(output.contains("1 fichier(s) accepté(s)"));
    assert!(export.exists());
}

#[test]
fn test_script_reports_errors_and_continues() {
    let (mut console, _) = console();
    let output = run(&mut console, "tab chat\nfly away\nwait 3000\nstart\ntab reviews\n");
    assert!(output.contains("ligne 1:"));
    assert!(output.contains("ligne 2:"));
    assert_eq!(console.app().active_tab(), Tab::Reviews);
}

#[test]
fn test_missing_upload_path_rejects_only_that_file() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("a.txt");
    fs::write(&notes, "hello").unwrap();
    let missing = dir.path().join("b.txt");

    let (mut console, notifier) = console();
    let output = run(
        &mut console,
        &format!("wait 3000\nstart\nupload {} {}\n", notes.display(), missing.display()),
    );

    assert_eq!(console.app().uploads().files().len(), 1);
    assert_eq!(console.app().uploads().files()[0].file.name, "a.txt");
    assert!(output.contains("1 fichier(s) accepté(s) [1], 1 refusé(s)"));
    assert!(!output.contains("ligne 3:"));
    assert!(notifier.all().iter().any(|n| n.title == "Fichier illisible"));
}

#[test]
fn test_blank_send_emits_notice() {
    let (mut console, notifier) = console();
    let output = run(&mut console, "wait 3000\nstart\nsend\n");
    assert!(output.contains("ligne 3:"));
    assert_eq!(notifier.last().unwrap().title, "Message vide");
}

#[test]
fn test_database_commands() {
    let (mut console, notifier) = console();
    run(
        &mut console,
        "wait 3000\nstart\ndb-kind postgresql\ndb-set database boutique\ndb-set username admin\nconnect\nwait 2000\nquery SELECT * FROM users\n",
    );
    let db = console.app().database();
    assert_eq!(db.form().port, "5432");
    assert_eq!(db.history().len(), 1);
    assert_eq!(db.history()[0].query, "SELECT * FROM users");
    assert_eq!(notifier.last().unwrap().title, "Requête exécutée");
}

#[test]
fn test_review_commands() {
    let (mut console, _) = console();
    run(
        &mut console,
        "wait 3000\nstart\nreview-set author Awa\nreview-set title Pratique\nreview-set comment Très utile\nreview-set rating 4\nreview-set category features\nreview-submit\nlike 5\nlike 5\nfilter rating 4\n",
    );
    let reviews = console.app().reviews();
    let review = reviews.get("5").unwrap();
    assert_eq!(review.comment, "Très utile");
    assert_eq!(review.like_count, 2);
    assert_eq!(reviews.visible().len(), 3);
}

#[test]
fn test_quit_and_blank_lines() {
    let (mut console, _) = console();
    assert_eq!(console.execute_line("   ").unwrap(), Flow::Continue(None));
    assert_eq!(console.execute_line("# note").unwrap(), Flow::Continue(None));
    assert_eq!(console.execute_line("quit").unwrap(), Flow::Quit);
    assert!(matches!(console.execute_line("help").unwrap(), Flow::Continue(Some(text)) if text.contains("review-submit")));
}
