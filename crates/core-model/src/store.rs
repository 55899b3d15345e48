//! The persistence boundary `core-model` depends on, rather than the other
//! way around. `core-store` implements this trait; keeping it here (instead
//! of a `core-model -> core-store` dependency) avoids a cycle, since
//! `core-store` must depend on `core-model`'s types to persist them.

use crate::types::{Port, ScriptValue, Sector};
use core_notify::PlayerStats;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Read/write access to persisted game state, as seen by the finalizer.
pub trait SectorStore {
    fn load_sector(&mut self, index: u32) -> Result<Option<Sector>, StoreError>;
    fn save_sector(&mut self, sector: &Sector) -> Result<(), StoreError>;

    fn load_port(&mut self, sector: u32) -> Result<Option<Port>, StoreError>;
    fn save_port(&mut self, sector: u32, port: &Port) -> Result<(), StoreError>;
    fn clear_port(&mut self, sector: u32) -> Result<(), StoreError>;

    fn load_player(&mut self) -> Result<Option<PlayerStats>, StoreError>;
    fn save_player(&mut self, player: &PlayerStats) -> Result<(), StoreError>;

    fn load_script_var(&mut self, name: &str) -> Result<Option<ScriptValue>, StoreError>;
    fn save_script_var(&mut self, name: &str, value: &ScriptValue) -> Result<(), StoreError>;
}
