//! Per-side partial knowledge of the opposing roster.
//! Entries appear lazily and only ever gain precision; a dead entry is final.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::ResolutionFeedback;
use crate::types::{Archetype, HeroStatus, ROSTER_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownStatus {
    Unknown,
    Alive,
    Dead,
}

impl From<HeroStatus> for KnownStatus {
    fn from(status: HeroStatus) -> Self {
        match status {
            HeroStatus::Alive => KnownStatus::Alive,
            HeroStatus::Dead => KnownStatus::Dead,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelEntry {
    pub position: u8,
    pub identity: Option<Archetype>,
    pub health: Option<i32>,
    pub status: KnownStatus,
}

impl IntelEntry {
    fn unknown(position: u8) -> Self {
        Self { position, identity: None, health: None, status: KnownStatus::Unknown }
    }

    fn is_dead(&self) -> bool {
        self.status == KnownStatus::Dead
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelLedger {
    entries: [Option<IntelEntry>; ROSTER_SIZE],
}

impl IntelLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, position: u8) -> Option<&IntelEntry> {
        self.entries.get(usize::from(position)).and_then(Option::as_ref)
    }

    pub fn is_known_dead(&self, position: u8) -> bool {
        self.entry(position).is_some_and(IntelEntry::is_dead)
    }

    /// Identity confirmed at some position other than `position`.
    pub fn confirmed_elsewhere(&self, position: u8, identity: Archetype) -> bool {
        self.entries
            .iter()
            .flatten()
            .any(|entry| entry.position != position && entry.identity == Some(identity))
    }

    pub fn snapshot(&self) -> Vec<IntelEntry> {
        self.entries.iter().flatten().cloned().collect()
    }

    fn slot(&mut self, position: u8) -> Option<&mut IntelEntry> {
        let slot = self.entries.get_mut(usize::from(position))?;
        Some(slot.get_or_insert_with(|| IntelEntry::unknown(position)))
    }

    pub fn confirm_identity(&mut self, position: u8, identity: Archetype) {
        if let Some(entry) = self.slot(position) {
            entry.identity = Some(identity);
            debug!(target: "battle.intel", position, %identity, "identity confirmed");
        }
    }

    pub fn observe(&mut self, position: u8, health: i32, status: HeroStatus) {
        let Some(entry) = self.slot(position) else {
            return;
        };
        if entry.is_dead() {
            return;
        }
        entry.status = status.into();
        entry.health = Some(if entry.is_dead() { 0 } else { health });
    }

    pub fn mark_dead(&mut self, position: u8) {
        if let Some(entry) = self.slot(position) {
            entry.health = Some(0);
            entry.status = KnownStatus::Dead;
        }
    }

    /// Folds one attack's feedback into the ledger.
    pub fn apply_feedback(&mut self, target: u8, feedback: &ResolutionFeedback) {
        if let Some(identity) = feedback.actual_identity {
            self.confirm_identity(target, identity);
        }
        self.observe(target, feedback.target_health, feedback.target_status);
        for &position in &feedback.newly_dead {
            self.mark_dead(position);
        }
    }
}
