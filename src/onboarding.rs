//! Loading splash and welcome screen
//!
//! `loading → welcome → main`, strictly forward. The loading counter runs on
//! its own timer and takes no input; the welcome screen waits for a single
//! "get started" action.

use std::time::Duration;
use tracing::{debug, info};

use crate::config::OnboardingConfig;
use crate::error::{PlatformError, Result};
use crate::scheduler::{Simulated, Timers};

/// Status line shown under the loading bar, indexed by step
pub const LOADING_STEPS: [&str; 3] = [
    "Initialisation de l'IA...",
    "Préparation de l'interface...",
    "Chargement des fonctionnalités...",
];

/// Progress values at which the loading step advances
const STEP_THRESHOLDS: [u8; 2] = [33, 66];

/// One entry of the welcome showcase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

/// Features listed on the welcome screen
pub const WELCOME_FEATURES: [Feature; 6] = [
    Feature {
        title: "IA Locale",
        description: "Intelligence artificielle qui fonctionne uniquement avec vos données",
    },
    Feature {
        title: "Documents PDF/Word",
        description: "Uploadez et analysez vos documents facilement",
    },
    Feature {
        title: "Base de données",
        description: "Connectez votre base de données pour des réponses précises",
    },
    Feature {
        title: "Chat Multilingue",
        description: "Français, Wolof, Anglais, Espagnol et plus",
    },
    Feature {
        title: "Système d'avis",
        description: "Partagez vos opinions et expériences",
    },
    Feature {
        title: "Sécurité totale",
        description: "Vos données restent locales, aucune fuite possible",
    },
];

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Welcome,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnboardingEvent {
    Tick,
    Settled,
}

/// The three-screen entry flow
pub struct Onboarding {
    stage: Stage,
    progress: u8,
    step: usize,
    config: OnboardingConfig,
    timers: Timers<OnboardingEvent>,
}

impl Onboarding {
    /// Start in `loading` with the first tick scheduled
    pub fn new(config: OnboardingConfig) -> Self {
        let mut timers = Timers::new();
        timers.schedule(config.tick_interval(), OnboardingEvent::Tick);
        Self {
            stage: Stage::Loading,
            progress: 0,
            step: 0,
            config,
            timers,
        }
    }

    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Loading progress, 0 to 100
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Index into [`LOADING_STEPS`]
    pub const fn step(&self) -> usize {
        self.step
    }

    pub fn status_message(&self) -> &'static str {
        LOADING_STEPS[self.step.min(LOADING_STEPS.len() - 1)]
    }

    /// Leave the welcome screen for the main application
    pub fn get_started(&mut self) -> Result<()> {
        if self.stage != Stage::Welcome {
            return Err(PlatformError::InvalidState(format!(
                "get started is only available on the welcome screen (current: {:?})",
                self.stage
            )));
        }
        self.stage = Stage::Main;
        info!("Entering main application");
        Ok(())
    }

    fn handle(&mut self, event: OnboardingEvent) {
        match event {
            OnboardingEvent::Tick => {
                self.progress = self.progress.saturating_add(self.config.progress_step).min(100);
                while self.step < STEP_THRESHOLDS.len() && self.progress >= STEP_THRESHOLDS[self.step] {
                    self.step += 1;
                    debug!(step = self.step, message = self.status_message(), "Loading step");
                }

                if self.progress >= 100 {
                    self.timers
                        .schedule(self.config.settle_delay(), OnboardingEvent::Settled);
                } else {
                    self.timers
                        .schedule(self.config.tick_interval(), OnboardingEvent::Tick);
                }
            }
            OnboardingEvent::Settled => {
                self.stage = Stage::Welcome;
                info!("Loading complete, showing welcome screen");
            }
        }
    }
}

impl Simulated for Onboarding {
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
