//! Top-level in-memory state the engine drives: which screen is open, the
//! snapshot(s) being assembled, and the player's own stats.

use crate::pending::{PendingPortReport, PendingSector};
use core_notify::PlayerStats;

/// Everything `core-model` owns between screen boundaries. The concrete
/// storage and notification objects are *not* owned here — they are passed
/// into `finalize_sector`/`finalize_port` by the caller (`core-engine`), so
/// this crate never depends on `core-store`.
#[derive(Debug, Default)]
pub struct GameState {
    pub pending_sector: Option<PendingSector>,
    pub pending_port: Option<PendingPortReport>,
    pub player: PlayerStats,
    pub current_sector: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a sector snapshot. Callers are responsible for
    /// finalizing any prior pending snapshot before calling this — the
    /// classifier's `Transition::Boundary` already guarantees that ordering.
    pub fn begin_sector(&mut self, index: u32, is_probe: bool) {
        self.pending_sector = Some(PendingSector::new(index, is_probe));
    }

    pub fn begin_port_report(&mut self, sector: u32, port_name: String) {
        self.pending_port = Some(PendingPortReport::new(sector, port_name));
    }

    /// Records the sector echoed by a command prompt (`spec.md` §4.B). This
    /// is the only place `current_sector` changes; it does not by itself
    /// imply a sector screen was seen.
    pub fn on_prompt_sector(&mut self, sector: u32) {
        self.current_sector = sector;
        self.player.current_sector = sector;
    }
}
