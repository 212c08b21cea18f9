//! Integration tests for the application shell

use plateforme_ia::app::{App, Strategies};
use plateforme_ia::config::AppConfig;
use plateforme_ia::database::FixedOutcome;
use plateforme_ia::models::{FileHandle, FileStatus};
use plateforme_ia::notify::RecordingNotifier;
use plateforme_ia::onboarding::Stage;
use plateforme_ia::router::Tab;
use std::sync::Arc;
use std::time::Duration;

fn app_with(connects: bool) -> (App, Arc<RecordingNotifier>) {
    let config = AppConfig::default();
    let notifier = Arc::new(RecordingNotifier::new());
    let mut strategies = Strategies::from_config(&config, Some(7));
    strategies.outcome = Box::new(FixedOutcome(connects));
    (App::with_strategies(&config, notifier.clone(), strategies), notifier)
}

fn main_app() -> (App, Arc<RecordingNotifier>) {
    let (mut app, notifier) = app_with(true);
    app.advance_to(Duration::from_secs(3));
    app.get_started().unwrap();
    (app, notifier)
}

fn pdf(name: &str) -> FileHandle {
    FileHandle::new(name, "application/pdf", vec![1, 2, 3])
}

#[test]
fn test_onboarding_flow() {
    let (mut app, _) = app_with(true);
    assert_eq!(app.stage(), Stage::Loading);
    assert!(app.get_started().is_err());

    app.advance_to(Duration::from_millis(2500));
    assert_eq!(app.onboarding().progress(), 100);
    assert_eq!(app.stage(), Stage::Loading);

    app.advance_to(Duration::from_millis(3000));
    assert_eq!(app.stage(), Stage::Welcome);
    assert!(app.select_tab(Tab::Chat).is_err());

    app.get_started().unwrap();
    assert_eq!(app.stage(), Stage::Main);
    assert_eq!(app.active_tab(), Tab::Dashboard);
    assert!(app.get_started().is_err());
    assert_eq!(app.next_deadline(), None);
}

#[test]
fn test_selecting_active_tab_changes_nothing() {
    let (mut app, notifier) = main_app();
    assert!(app.select_tab(Tab::Upload).unwrap());
    assert!(!app.select_tab(Tab::Upload).unwrap());
    assert_eq!(app.active_tab(), Tab::Upload);
    assert!(notifier.all().is_empty());
}

#[test]
fn test_sessions_survive_tab_switches() {
    let (mut app, _) = main_app();
    app.select_tab(Tab::Chat).unwrap();
    app.send_chat("bonjour").unwrap();
    app.select_tab(Tab::Reviews).unwrap();
    app.advance_by(Duration::from_millis(1500));
    app.select_tab(Tab::Chat).unwrap();
    assert_eq!(app.chat().messages().len(), 3);
}

#[test]
fn test_chat_sees_live_file_count() {
    let (mut app, _) = main_app();
    app.upload(vec![pdf("a.pdf"), pdf("b.pdf")]).unwrap();
    app.send_chat("combien de documents ?").unwrap();
    app.advance_by(Duration::from_millis(1500));
    assert_eq!(
        app.chat().messages().last().unwrap().text,
        "J'ai accès à 2 document(s) uploadé(s). Posez-moi une question sur leur contenu !"
    );
}

#[test]
fn test_chat_sees_connection_flag() {
    let (mut app, _) = main_app();
    app.database_mut().form_mut().database = "boutique".into();
    app.database_mut().form_mut().username = "admin".into();
    app.connect_database().unwrap();
    app.advance_by(Duration::from_secs(2));

    app.send_chat("ma base ?").unwrap();
    app.advance_by(Duration::from_millis(1500));
    assert_eq!(
        app.chat().messages().last().unwrap().text,
        "La base de données est connectée. Je peux analyser vos données."
    );
    assert!(app.dashboard().database_connected);

    app.disconnect_database().unwrap();
    assert!(!app.dashboard().database_connected);
}

#[test]
fn test_dashboard_tracks_uploads_and_activity() {
    let (mut app, _) = main_app();
    let report = app.upload(vec![pdf("a.pdf"), pdf("b.pdf")]).unwrap();
    app.remove_file(report.accepted[0]).unwrap();
    app.advance_by(Duration::from_secs(3));

    let dashboard = app.dashboard();
    assert_eq!(dashboard.documents_processed, 1);
    assert_eq!(dashboard.documents_ready, 1);
    assert_eq!(dashboard.total_queries, 47);
    let actions: Vec<&str> = dashboard
        .recent_activity
        .iter()
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(actions, vec!["Documents mis à jour", "Documents mis à jour"]);
    assert_eq!(dashboard.recent_activity[0].detail.as_deref(), Some("1 fichier(s)"));
}

#[test]
fn test_activity_feed_is_bounded() {
    let (mut app, _) = main_app();
    for i in 0..4 {
        app.upload(vec![pdf(&format!("{i}.pdf"))]).unwrap();
        app.send_chat(format!("message {i}")).unwrap();
        app.advance_by(Duration::from_millis(1500));
    }
    assert_eq!(app.activity().len(), 5);
    assert_eq!(app.activity().entries().next().unwrap().action, "Chat multilingue");
}

#[test]
fn test_review_submission_through_app() {
    let (mut app, notifier) = main_app();
    app.reviews_mut().form_mut().author = "Awa".into();
    app.reviews_mut().form_mut().title = "Super".into();
    app.reviews_mut().form_mut().comment = "Rien à redire".into();
    let review = app.submit_review().unwrap();
    assert_eq!(app.like_review(&review.id).unwrap(), 1);
    assert_eq!(app.like_review(&review.id).unwrap(), 2);
    assert_eq!(app.reviews().stats().total, 5);
    assert_eq!(notifier.last().unwrap().title, "Avis ajouté");
}

#[test]
fn test_shutdown_stops_every_mutation() {
    let (mut app, notifier) = main_app();
    let id = app.upload(vec![pdf("a.pdf")]).unwrap().accepted[0];
    app.send_chat("bonjour").unwrap();
    app.database_mut().form_mut().database = "boutique".into();
    app.database_mut().form_mut().username = "admin".into();
    app.connect_database().unwrap();
    app.advance_by(Duration::from_millis(300));
    let before = notifier.all().len();

    app.shutdown();
    assert!(app.is_shut_down());
    assert_eq!(app.next_deadline(), None);
    app.advance_by(Duration::from_secs(60));

    assert_eq!(app.now(), Duration::from_millis(3300));
    assert_eq!(app.uploads().get(id).unwrap().status, FileStatus::Uploading);
    assert_eq!(app.chat().messages().len(), 2);
    assert!(!app.database().is_connected());
    assert_eq!(notifier.all().len(), before);
    assert!(app.send_chat("encore").is_err());
}

#[test]
fn test_seeded_reviews_can_be_disabled() {
    let mut config = AppConfig::default();
    config.reviews.seed_reviews = false;
    let app = App::new(&config, Arc::new(RecordingNotifier::new()));
    assert!(app.reviews().reviews().is_empty());
}
