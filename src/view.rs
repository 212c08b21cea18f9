//! Plain-text rendering of the current screen for the console.

use std::fmt::{self, Write};

use crate::app::App;
use crate::chat::ChatSession;
use crate::dashboard::DashboardSnapshot;
use crate::database::{ConnectionState, DatabaseSession, SUGGESTED_QUERIES};
use crate::models::{Sender, UploadedFile};
use crate::onboarding::{Onboarding, Stage, WELCOME_FEATURES};
use crate::reviews::ReviewStore;
use crate::router::Tab;

const BAR_WIDTH: usize = 20;

/// Render whatever the user would currently see
pub fn render(app: &App) -> String {
    let mut out = String::new();
    let written = match app.stage() {
        Stage::Loading => write_loading(&mut out, app.onboarding()),
        Stage::Welcome => write_welcome(&mut out),
        Stage::Main => write_main(&mut out, app),
    };
    // Writing into a String cannot fail
    debug_assert!(written.is_ok());
    out
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn write_loading(out: &mut String, onboarding: &Onboarding) -> fmt::Result {
    writeln!(out, "Plateforme IA")?;
    writeln!(out, "{} {}%", bar(onboarding.progress()), onboarding.progress())?;
    writeln!(out, "{}", onboarding.status_message())
}

fn write_welcome(out: &mut String) -> fmt::Result {
    writeln!(out, "Bienvenue sur votre Plateforme IA Locale")?;
    for feature in &WELCOME_FEATURES {
        writeln!(out, "  * {}: {}", feature.title, feature.description)?;
    }
    writeln!(out, "Tapez `start` pour commencer.")
}

fn write_main(out: &mut String, app: &App) -> fmt::Result {
    let active = app.active_tab();
    let nav: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    writeln!(out, "{}", nav.join(" | "))?;
    writeln!(out)?;

    match active {
        Tab::Dashboard => write_dashboard(out, &app.dashboard()),
        Tab::Chat => write_chat(out, app.chat()),
        Tab::Upload => write_uploads(out, app.uploads().files(), app.uploads().ready_count()),
        Tab::Database => write_database(out, app.database()),
        Tab::Reviews => write_reviews(out, app.reviews()),
    }
}

fn write_dashboard(out: &mut String, snapshot: &DashboardSnapshot) -> fmt::Result {
    writeln!(
        out,
        "Requêtes: {}  Documents: {}  Temps moyen: {}  Précision: {}%",
        snapshot.total_queries,
        snapshot.documents_processed,
        snapshot.average_response_time,
        snapshot.accuracy_rate
    )?;
    let status = if snapshot.database_connected {
        "Connectée"
    } else {
        "Déconnectée"
    };
    writeln!(out, "Base de données: {status}")?;
    writeln!(out, "Capacités:")?;
    for capability in &snapshot.capabilities {
        writeln!(out, "  {:<16} {} {}%", capability.name, bar(capability.level), capability.level)?;
    }
    writeln!(out, "Activité récente:")?;
    if snapshot.recent_activity.is_empty() {
        writeln!(out, "  (aucune)")?;
    }
    for entry in &snapshot.recent_activity {
        match &entry.detail {
            Some(detail) => writeln!(out, "  {} {} - {}", entry.time.format("%H:%M"), entry.action, detail)?,
            None => writeln!(out, "  {} {}", entry.time.format("%H:%M"), entry.action)?,
        }
    }
    Ok(())
}

fn write_chat(out: &mut String, chat: &ChatSession) -> fmt::Result {
    for message in chat.messages() {
        let who = match message.sender {
            Sender::User => "Vous",
            Sender::Assistant => "IA",
        };
        writeln!(out, "{} {}: {}", message.timestamp.format("%H:%M"), who, message.text)?;
    }
    if chat.is_pending() {
        writeln!(out, "IA est en train d'écrire...")?;
    }
    writeln!(
        out,
        "Langue: {}{}",
        chat.language().name(),
        if chat.is_listening() { "  (micro actif)" } else { "" }
    )
}

fn write_uploads(out: &mut String, files: &[UploadedFile], ready: usize) -> fmt::Result {
    writeln!(out, "PDF, DOC, DOCX, TXT - 10MB max par fichier")?;
    if files.is_empty() {
        return writeln!(out, "Aucun document.");
    }
    for record in files {
        writeln!(
            out,
            "#{} {} ({:.2} MB) {} {}",
            record.id,
            record.file.name,
            record.file.size_mib(),
            record.status.label(),
            bar(record.progress)
        )?;
        if let Some(error) = &record.error {
            writeln!(out, "    {error}")?;
        }
    }
    writeln!(out, "{ready} document(s) prêt(s) pour l'analyse IA")
}

fn write_database(out: &mut String, db: &DatabaseSession) -> fmt::Result {
    let form = db.form();
    let state = match db.state() {
        ConnectionState::Disconnected => "déconnecté",
        ConnectionState::Connecting => "connexion...",
        ConnectionState::Connected => "connecté",
    };
    writeln!(
        out,
        "{} {}:{} base={} utilisateur={} ({state})",
        form.kind.label(),
        form.host,
        form.port,
        form.database,
        form.username
    )?;
    if !db.is_connected() {
        return Ok(());
    }
    writeln!(out, "Tables: {}", db.tables().join(", "))?;
    writeln!(out, "Suggestions:")?;
    for query in SUGGESTED_QUERIES {
        writeln!(out, "  {query}")?;
    }
    for result in db.history() {
        writeln!(out, "> {} ({} lignes)", result.query, result.rows.len())?;
        for row in &result.rows {
            writeln!(out, "  {} | {} | {} | {}", row.id, row.name, row.email, row.created_at)?;
        }
    }
    Ok(())
}

fn write_reviews(out: &mut String, store: &ReviewStore) -> fmt::Result {
    let stats = store.stats();
    writeln!(
        out,
        "Note moyenne: {:.1}  Avis: {}  Satisfaction: {:.0}%",
        stats.average_rating, stats.total, stats.satisfaction_percent
    )?;
    for review in store.visible() {
        writeln!(
            out,
            "[{}] {} {} - {} ({}, {}) +{} -{}",
            review.id,
            "*".repeat(usize::from(review.rating)),
            review.title,
            review.author,
            review.language.name(),
            review.category.label(),
            review.like_count,
            review.dislike_count
        )?;
        writeln!(out, "    {}", review.comment)?;
    }
    Ok(())
}
