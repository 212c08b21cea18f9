//! User reviews
//!
//! Reviews are only ever added and reacted to. The visible list and the
//! statistics are recomputed from the full collection on every read.

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PlatformError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{Language, Review, ReviewCategory, ReviewDraft, ReviewFilter};
use crate::notify::{Notification, SharedNotifier};
use crate::validation::InputValidator;

/// Aggregates shown above the list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    /// Mean rating, 0 when there are no reviews
    pub average_rating: f64,
    /// Number of reviews
    pub total: usize,
    /// Share of reviews rated 4 or 5, in percent
    pub satisfaction_percent: f64,
}

/// Compute the aggregates of a review collection
pub fn compute_stats(reviews: &[Review]) -> ReviewStats {
    if reviews.is_empty() {
        return ReviewStats {
            average_rating: 0.0,
            total: 0,
            satisfaction_percent: 0.0,
        };
    }

    let total = reviews.len();
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let satisfied = reviews.iter().filter(|r| r.rating >= 4).count();
    ReviewStats {
        average_rating: f64::from(sum) / total as f64,
        total,
        satisfaction_percent: satisfied as f64 * 100.0 / total as f64,
    }
}

/// Reviews matching `filter`, in collection order
pub fn filter_reviews<'a>(reviews: &'a [Review], filter: &ReviewFilter) -> Vec<&'a Review> {
    reviews.iter().filter(|r| filter.matches(r)).collect()
}

/// Reviews present when the application starts
pub fn seed_reviews() -> Vec<Review> {
    let date = |day: u32| {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| Local.from_local_datetime(&dt).earliest())
            .unwrap_or_else(Local::now)
    };

    vec![
        Review {
            id: "1".into(),
            author: "Amadou Diallo".into(),
            rating: 5,
            title: "Excellent pour l'analyse de documents".into(),
            comment: "Cette plateforme IA est vraiment impressionnante ! Elle analyse mes documents PDF en français et en wolof avec une précision remarquable. L'interface est intuitive et les réponses sont très pertinentes.".into(),
            date: date(15),
            like_count: 12,
            dislike_count: 1,
            language: Language::Fr,
            category: ReviewCategory::Ai,
        },
        Review {
            id: "2".into(),
            author: "Fatou Sow".into(),
            rating: 4,
            title: "Dañuy def ci wolof!".into(),
            comment: "IA bi dañ ko def lool! Man naa ko jënd ak sama documents yi te mu tontu ci wolof. Waaye bëgg naa ni ñu yokk ko lu gën a gàcce.".into(),
            date: date(14),
            like_count: 8,
            dislike_count: 0,
            language: Language::Wo,
            category: ReviewCategory::Features,
        },
        Review {
            id: "3".into(),
            author: "John Smith".into(),
            rating: 5,
            title: "Perfect for multilingual document analysis".into(),
            comment: "Amazing platform! The AI understands multiple languages perfectly and provides accurate responses based on uploaded documents. The local processing is a great security feature.".into(),
            date: date(13),
            like_count: 15,
            dislike_count: 2,
            language: Language::En,
            category: ReviewCategory::Ai,
        },
        Review {
            id: "4".into(),
            author: "Maria Garcia".into(),
            rating: 4,
            title: "Excelente para el análisis de documentos".into(),
            comment: "La plataforma es muy buena para analizar documentos en español. La IA local es rápida y segura. Me gusta mucho la interfaz de usuario, aunque podría mejorar la velocidad de carga.".into(),
            date: date(12),
            like_count: 6,
            dislike_count: 1,
            language: Language::Es,
            category: ReviewCategory::Ui,
        },
    ]
}

#[derive(Debug, Clone, Copy)]
enum Reaction {
    Like,
    Dislike,
}

/// The review collection, its submission form and its filter
pub struct ReviewStore {
    reviews: Vec<Review>,
    form: ReviewDraft,
    filter: ReviewFilter,
    next_id: u64,
    notifier: SharedNotifier,
    metrics: MetricsCollector,
}

impl ReviewStore {
    pub fn new(notifier: SharedNotifier) -> Self {
        Self::with_reviews(Vec::new(), notifier)
    }

    pub fn with_reviews(reviews: Vec<Review>, notifier: SharedNotifier) -> Self {
        let next_id = reviews
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            reviews,
            form: ReviewDraft::default(),
            filter: ReviewFilter::default(),
            next_id,
            notifier,
            metrics: MetricsCollector::default(),
        }
    }

    /// Every review, newest submission first
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn get(&self, id: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    pub fn form(&self) -> &ReviewDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReviewDraft {
        &mut self.form
    }

    pub const fn filter(&self) -> &ReviewFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut ReviewFilter {
        &mut self.filter
    }

    pub fn clear_filter(&mut self) {
        self.filter = ReviewFilter::default();
    }

    /// Reviews passing the current filter
    pub fn visible(&self) -> Vec<&Review> {
        filter_reviews(&self.reviews, &self.filter)
    }

    pub fn stats(&self) -> ReviewStats {
        compute_stats(&self.reviews)
    }

    /// Publish the form as a new review and reset the form
    pub fn submit(&mut self) -> Result<&Review> {
        let checks = InputValidator::validate_required("author", &self.form.author)
            .and_then(|()| InputValidator::validate_required("title", &self.form.title))
            .and_then(|()| InputValidator::validate_required("comment", &self.form.comment))
            .and_then(|()| InputValidator::validate_rating(self.form.rating));
        if let Err(err) = checks {
            self.notifier.notify(Notification::destructive(
                "Champs requis",
                "Veuillez remplir tous les champs obligatoires",
            ));
            return Err(err);
        }

        let draft = std::mem::take(&mut self.form);
        let review = Review {
            id: self.next_id.to_string(),
            author: InputValidator::sanitize_text(&draft.author),
            rating: draft.rating,
            title: InputValidator::sanitize_text(&draft.title),
            comment: InputValidator::sanitize_text(&draft.comment),
            date: Local::now(),
            like_count: 0,
            dislike_count: 0,
            language: draft.language,
            category: draft.category,
        };
        self.next_id += 1;

        info!(review_id = %review.id, rating = review.rating, category = ?review.category, "Review submitted");
        self.metrics.record_review_submitted(review.rating);
        self.notifier
            .notify(Notification::success("Avis ajouté", "Merci pour votre retour !"));

        self.reviews.insert(0, review);
        Ok(&self.reviews[0])
    }

    pub fn like(&mut self, id: &str) -> Result<u64> {
        self.react(id, Reaction::Like)
    }

    pub fn dislike(&mut self, id: &str) -> Result<u64> {
        self.react(id, Reaction::Dislike)
    }

    fn react(&mut self, id: &str, reaction: Reaction) -> Result<u64> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PlatformError::NotFound(format!("review {id}")))?;

        let (counter, label) = match reaction {
            Reaction::Like => (&mut review.like_count, "like"),
            Reaction::Dislike => (&mut review.dislike_count, "dislike"),
        };
        *counter += 1;
        debug!(review_id = id, reaction = label, count = *counter, "Review reaction");
        self.metrics.record_review_reaction(label);
        Ok(*counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use std::sync::Arc;

    fn store() -> (ReviewStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (ReviewStore::with_reviews(seed_reviews(), notifier.clone()), notifier)
    }

    #[test]
    fn test_seed_stats() {
        let (store, _) = store();
        let stats = store.stats();
        assert_eq!(stats.total, 4);
        assert!((stats.average_rating - 4.5).abs() < f64::EPSILON);
        assert!((stats.satisfaction_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.average_rating.abs() < f64::EPSILON);
    }

    #[test]
    fn test_submit_prepends_and_resets_form() {
        let (mut store, notifier) = store();
        store.form_mut().author = "Awa".into();
        store.form_mut().title = "Top".into();
        store.form_mut().comment = "Très utile".into();
        store.form_mut().rating = 3;

        let review = store.submit().unwrap();
        assert_eq!(review.id, "5");
        assert_eq!(review.like_count, 0);
        assert_eq!(store.reviews()[0].author, "Awa");
        assert_eq!(store.form(), &ReviewDraft::default());
        assert_eq!(notifier.last().unwrap().title, "Avis ajouté");
    }

    #[test]
    fn test_unknown_review_reaction() {
        let (mut store, _) = store();
        assert!(store.like("42").is_err());
        assert_eq!(store.dislike("2").unwrap(), 1);
    }

    #[test]
    fn test_filter_and_clear() {
        let (mut store, _) = store();
        store.filter_mut().category = Some(ReviewCategory::Ai);
        assert_eq!(store.visible().len(), 2);
        store.filter_mut().language = Some(Language::En);
        assert_eq!(store.visible().len(), 1);
        store.clear_filter();
        assert_eq!(store.visible().len(), 4);
    }
}
