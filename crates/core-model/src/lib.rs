//! Data model and sector-snapshot finalizer (`spec.md` §3, §4.G).

mod finalize;
mod pending;
mod state;
mod store;
pub mod types;

pub use finalize::{finalize_port, finalize_sector};
pub use pending::{PendingPortReport, PendingSector};
pub use state::GameState;
pub use store::{SectorStore, StoreError};
pub use types::*;
