//! Signup prompt pacing for anonymous visitors.
//!
//! Engagement is counted as quick-view opens and favorite attempts. The
//! prompt appears once either threshold is reached; after a dismissal it
//! stays hidden for the cooldown. Authenticated users never see it.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

pub const VIEW_THRESHOLD: u32 = 5;
pub const FAVORITE_THRESHOLD: u32 = 1;

pub fn dismiss_cooldown() -> Duration {
    Duration::hours(48)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureEvent {
    QuickViewOpened,
    FavoriteAttempted,
    Dismissed,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPressure {
    pub views: u32,
    pub favorite_attempts: u32,
    pub dismissed_at: Option<Timestamp>,
    pub authenticated: bool,
}

impl SignupPressure {
    pub fn record(&mut self, event: PressureEvent, now: Timestamp) {
        match event {
            PressureEvent::QuickViewOpened => self.views = self.views.saturating_add(1),
            PressureEvent::FavoriteAttempted => {
                self.favorite_attempts = self.favorite_attempts.saturating_add(1)
            }
            PressureEvent::Dismissed => {
                self.dismissed_at = Some(now);
                self.views = 0;
                self.favorite_attempts = 0;
            }
            PressureEvent::Authenticated => self.authenticated = true,
        }
    }

    fn in_cooldown(&self, now: Timestamp) -> bool {
        self.dismissed_at
            .is_some_and(|at| now < at + dismiss_cooldown())
    }

    pub fn should_prompt(&self, now: Timestamp) -> bool {
        if self.authenticated || self.in_cooldown(now) {
            return false;
        }
        self.views >= VIEW_THRESHOLD || self.favorite_attempts >= FAVORITE_THRESHOLD
    }
}
