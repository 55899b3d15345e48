//! Change notification interface for the game-state engine.
//!
//! A single observer is published through an atomic slot so a concurrent
//! `set_observer` can never tear a notification mid-delivery: every fire
//! method takes one `ArcSwapOption::load` snapshot before touching the
//! callback. Observers are expected to return promptly (`spec.md` §4.I);
//! any panic is caught at this single boundary, logged, and parsing
//! continues.

use arc_swap::ArcSwapOption;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

/// Serialized view of a sector, as delivered to `on_current_sector_changed`
/// and `on_sector_updated`. Deliberately flat and owned: no pointers back
/// into engine-internal state.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorView {
    pub number: u32,
    pub nav_haz: i32,
    pub has_traders: i32,
    pub constellation: String,
    pub beacon: String,
    pub warps: Vec<u32>,
    pub has_port: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortView {
    pub sector_id: u32,
    pub name: String,
    pub class_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub credits: i64,
    pub experience: i64,
    pub alignment: i64,
    pub turns: i64,
    pub ship_number: i32,
    pub total_holds: i32,
    pub ore_holds: i32,
    pub org_holds: i32,
    pub equ_holds: i32,
    pub col_holds: i32,
    pub fighters: i64,
    pub shields: i64,
    pub photons: i32,
    pub armid_mines: i32,
    pub limpet_mines: i32,
    pub genesis_torps: i32,
    pub cloaks: i32,
    pub beacons: i32,
    pub atomics: i32,
    pub corbomite: i32,
    pub eprobes: i32,
    pub mine_disruptors: i32,
    pub current_sector: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            credits: 0,
            experience: 0,
            alignment: 0,
            turns: 0,
            ship_number: 0,
            total_holds: 0,
            ore_holds: 0,
            org_holds: 0,
            equ_holds: 0,
            col_holds: 0,
            fighters: 0,
            shields: 0,
            photons: 0,
            armid_mines: 0,
            limpet_mines: 0,
            genesis_torps: 0,
            cloaks: 0,
            beacons: 0,
            atomics: 0,
            corbomite: 0,
            eprobes: 0,
            mine_disruptors: 0,
            current_sector: 0,
        }
    }
}

impl PlayerStats {
    /// `total_holds - (ore + org + equ + col)`, used both to derive the
    /// empty-holds field from an info display and, here, as a read-only
    /// convenience for observers.
    pub fn empty_holds(&self) -> i32 {
        self.total_holds - (self.ore_holds + self.org_holds + self.equ_holds + self.col_holds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderInfo {
    pub name: String,
    pub figs: i64,
    pub ship_name: String,
    pub ship_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderUpdate {
    pub sector: u32,
    pub traders: Vec<TraderInfo>,
}

/// The observer interface registered by the external collaborator
/// (terminal UI / scripting runtime). All methods default to no-ops so a
/// partial implementation (or none at all) is always valid.
pub trait Observer: Send + Sync {
    fn on_current_sector_changed(&self, _view: &SectorView) {}
    fn on_sector_updated(&self, _view: &SectorView) {}
    fn on_port_updated(&self, _view: &PortView) {}
    fn on_player_stats_updated(&self, _stats: &PlayerStats) {}
    fn on_trader_data_updated(&self, _update: &TraderUpdate) {}
}

/// No-op observer, used before any collaborator registers one.
pub struct NoopObserver;
impl Observer for NoopObserver {}

pub static NOTIFICATIONS_FIRED: AtomicU64 = AtomicU64::new(0);
pub static OBSERVER_PANICS: AtomicU64 = AtomicU64::new(0);

/// Holds the current observer behind an atomically-published slot.
///
/// `set_observer` is safe to call from any thread; every `fire_*` call
/// loads the current observer once (an `Arc` clone via `ArcSwapOption::load_full`)
/// so a replacement racing with in-flight delivery never mutates the view
/// a notification is currently using.
pub struct NotificationBus {
    slot: ArcSwapOption<dyn Observer>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::from(None),
        }
    }

    pub fn set_observer(&self, observer: std::sync::Arc<dyn Observer>) {
        self.slot.store(Some(observer));
    }

    pub fn clear_observer(&self) {
        self.slot.store(None);
    }

    fn dispatch(&self, label: &'static str, f: impl FnOnce(&dyn Observer) + std::panic::UnwindSafe) {
        let Some(observer) = self.slot.load_full() else {
            return;
        };
        NOTIFICATIONS_FIRED.fetch_add(1, Ordering::Relaxed);
        let observer_ref = observer.as_ref();
        let result = catch_unwind(AssertUnwindSafe(|| f(observer_ref)));
        if result.is_err() {
            OBSERVER_PANICS.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(target: "notify", callback = label, "observer_panicked");
        }
    }

    pub fn current_sector_changed(&self, view: &SectorView) {
        self.dispatch("on_current_sector_changed", |o| o.on_current_sector_changed(view));
    }

    pub fn sector_updated(&self, view: &SectorView) {
        self.dispatch("on_sector_updated", |o| o.on_sector_updated(view));
    }

    pub fn port_updated(&self, view: &PortView) {
        self.dispatch("on_port_updated", |o| o.on_port_updated(view));
    }

    pub fn player_stats_updated(&self, stats: &PlayerStats) {
        self.dispatch("on_player_stats_updated", |o| o.on_player_stats_updated(stats));
    }

    pub fn trader_data_updated(&self, update: &TraderUpdate) {
        self.dispatch("on_trader_data_updated", |o| o.on_trader_data_updated(update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct CountingObserver {
        sector_changes: AtomicUsize,
    }

    impl Observer for CountingObserver {
        fn on_current_sector_changed(&self, _view: &SectorView) {
            self.sector_changes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn no_observer_is_silent() {
        let bus = NotificationBus::new();
        bus.current_sector_changed(&SectorView {
            number: 1,
            nav_haz: 0,
            has_traders: 0,
            constellation: String::new(),
            beacon: String::new(),
            warps: vec![],
            has_port: false,
        });
    }

    #[test]
    fn registered_observer_receives_events() {
        let bus = NotificationBus::new();
        let observer = Arc::new(CountingObserver {
            sector_changes: AtomicUsize::new(0),
        });
        bus.set_observer(observer.clone());
        bus.current_sector_changed(&SectorView {
            number: 286,
            nav_haz: 0,
            has_traders: 0,
            constellation: "Federation Space".into(),
            beacon: String::new(),
            warps: vec![39, 844],
            has_port: true,
        });
        assert_eq!(observer.sector_changes.load(Ordering::Relaxed), 1);
    }

    struct PanickingObserver;
    impl Observer for PanickingObserver {
        fn on_port_updated(&self, _view: &PortView) {
            panic!("boom");
        }
    }

    #[test]
    fn observer_panic_is_caught_and_parsing_continues() {
        let bus = NotificationBus::new();
        bus.set_observer(Arc::new(PanickingObserver));
        let before = OBSERVER_PANICS.load(Ordering::Relaxed);
        bus.port_updated(&PortView {
            sector_id: 1,
            name: "Grav".into(),
            class_type: 7,
        });
        assert_eq!(OBSERVER_PANICS.load(Ordering::Relaxed), before + 1);
        // Bus remains usable after a panicking callback.
        bus.port_updated(&PortView {
            sector_id: 2,
            name: "Aachen".into(),
            class_type: 2,
        });
    }

    #[test]
    fn clearing_observer_silences_future_events() {
        let bus = NotificationBus::new();
        let observer = Arc::new(CountingObserver {
            sector_changes: AtomicUsize::new(0),
        });
        bus.set_observer(observer.clone());
        bus.clear_observer();
        bus.current_sector_changed(&SectorView {
            number: 1,
            nav_haz: 0,
            has_traders: 0,
            constellation: String::new(),
            beacon: String::new(),
            warps: vec![],
            has_port: false,
        });
        assert_eq!(observer.sector_changes.load(Ordering::Relaxed), 0);
    }
}
