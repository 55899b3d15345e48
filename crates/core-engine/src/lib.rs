//! Top-level facade (`spec.md` §5/§6): wires the line assembler, the
//! classifier, the four field-level parsers, the finalizer, and the store
//! into a single synchronous API.
//!
//! `process_chunk`/`finalize` are the only write path and are meant to be
//! driven by one thread at a time; the store is still kept behind an
//! `RwLock` (rather than a bare field) so a future caller can add a
//! concurrent read-only API (`load_sector`, `load_script_var`, ...) without
//! re-architecting this crate.

use core_classify::{classify, Mode, Transition};
use core_line::LineAssembler;
use core_model::{finalize_port, finalize_sector, GameState, SectorStore};
use core_notify::{NotificationBus, Observer, PlayerStats};
use core_store::{OpenError, Store};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] core_model::StoreError),
    #[error("failed to open store: {0}")]
    Open(#[from] OpenError),
}

struct Parser {
    line: LineAssembler,
    mode: Mode,
    state: GameState,
    sector_scratch: core_sector::Scratch,
    /// Whether a turn has already been charged for the port-trade screen in
    /// progress. A screen can report several commodities across several
    /// lines but costs exactly one turn; this is cleared each time a new
    /// commerce report begins.
    traded_this_screen: bool,
}

impl Parser {
    fn new() -> Self {
        Self {
            line: LineAssembler::new(),
            mode: Mode::default(),
            state: GameState::new(),
            sector_scratch: core_sector::Scratch::new(),
            traded_this_screen: false,
        }
    }
}

/// Drives the whole pipeline from raw bytes to persisted, notified state.
///
/// One `Engine` owns one game session: one [`GameState`], one open
/// [`Store`], one [`NotificationBus`]. Constructing a second `Engine` over
/// the same database file is the caller's mistake to avoid, same as two
/// `rusqlite::Connection`s racing on one file would be.
pub struct Engine {
    notify: NotificationBus,
    parser: std::sync::Mutex<Parser>,
    store: RwLock<Store>,
}

impl Engine {
    /// Opens (creating if absent) the database at `database_path`, or runs
    /// fully in-memory if `None` — the same rule `core-config::EngineConfig`
    /// documents for a missing `database_path` key.
    pub fn open(database_path: Option<&Path>) -> Result<Self, CoreError> {
        let store = match database_path {
            Some(path) if path.exists() => Store::open(path)?,
            Some(path) => Store::create(path)?,
            None => Store::open_in_memory()?,
        };
        Ok(Self {
            notify: NotificationBus::new(),
            parser: std::sync::Mutex::new(Parser::new()),
            store: RwLock::new(store),
        })
    }

    /// Opens per a loaded [`core_config::EngineConfig`] — the usual entry
    /// point for a binary that first calls `core_config::load_from`.
    pub fn from_config(config: &core_config::EngineConfig) -> Result<Self, CoreError> {
        Self::open(config.database_path().map(std::path::PathBuf::as_path))
    }

    pub fn set_observer(&self, observer: Arc<dyn Observer>) {
        self.notify.set_observer(observer);
    }

    pub fn clear_observer(&self) {
        self.notify.clear_observer();
    }

    /// Feeds a chunk of raw server bytes through the pipeline. Chunk
    /// boundaries have no semantic effect (`spec.md` §8 P1) — only complete
    /// lines are ever classified or parsed.
    pub fn process_chunk(&self, bytes: &[u8]) -> Result<(), CoreError> {
        let lines = {
            let mut parser = self.parser.lock().unwrap();
            parser.line.process_chunk(bytes)
        };
        for line in lines {
            self.process_line(&line)?;
        }
        Ok(())
    }

    /// Flushes any residual buffered partial line and finalizes any pending
    /// sector/port snapshot, as if a command prompt had just been seen. Call
    /// this at end-of-stream (spec.md §6).
    pub fn finalize(&self) -> Result<(), CoreError> {
        let residual = {
            let mut parser = self.parser.lock().unwrap();
            parser.line.finalize()
        };
        if let Some(line) = residual {
            self.process_line(&line)?;
        }
        let mut parser = self.parser.lock().unwrap();
        let mut store = self.store.write().unwrap();
        finalize_sector(&mut parser.state, &mut *store, &self.notify)?;
        finalize_port(&mut parser.state, &mut *store, &self.notify)?;
        Ok(())
    }

    /// Returns the player's last-prompted sector and full stats snapshot.
    /// Exposed for a scripting collaborator that wants current state without
    /// waiting on the next notification.
    pub fn player_snapshot(&self) -> PlayerStats {
        self.parser.lock().unwrap().state.player
    }

    /// Script-variable and sector read access for a scripting collaborator
    /// (`spec.md` §5) — safe to call from a thread other than the one
    /// driving `process_chunk`, since it only ever takes the store's lock.
    pub fn load_sector(&self, index: u32) -> Result<Option<core_model::Sector>, CoreError> {
        let mut store = self.store.write().unwrap();
        Ok(store.load_sector(index)?)
    }

    pub fn load_port(&self, sector: u32) -> Result<Option<core_model::Port>, CoreError> {
        let mut store = self.store.write().unwrap();
        Ok(store.load_port(sector)?)
    }

    pub fn load_script_var(&self, name: &str) -> Result<Option<core_model::ScriptValue>, CoreError> {
        let mut store = self.store.write().unwrap();
        Ok(store.load_script_var(name)?)
    }

    pub fn save_script_var(&self, name: &str, value: &core_model::ScriptValue) -> Result<(), CoreError> {
        let mut store = self.store.write().unwrap();
        Ok(store.save_script_var(name, value)?)
    }

    fn process_line(&self, line: &str) -> Result<(), CoreError> {
        let mut parser = self.parser.lock().unwrap();
        let transition = classify(parser.mode, line);
        match transition {
            Transition::Prompt { sector } => {
                self.commit_pending(&mut parser)?;
                parser.state.on_prompt_sector(sector);
                parser.mode = Mode::Idle;
            }
            Transition::Boundary { entering } => {
                self.commit_pending(&mut parser)?;
                parser.mode = entering;
                if entering == Mode::InPortReport {
                    parser.traded_this_screen = false;
                }
                self.begin_mode(&mut parser, line)?;
            }
            Transition::Blank => {
                if parser.mode == Mode::InPortReport {
                    self.commit_pending(&mut parser)?;
                    parser.mode = Mode::Idle;
                }
            }
            Transition::Continue => {
                self.dispatch_continue(&mut parser, line)?;
            }
        }
        Ok(())
    }

    fn commit_pending(&self, parser: &mut Parser) -> Result<(), CoreError> {
        let mut store = self.store.write().unwrap();
        finalize_sector(&mut parser.state, &mut *store, &self.notify)?;
        finalize_port(&mut parser.state, &mut *store, &self.notify)?;
        Ok(())
    }

    /// Applies whatever the boundary line itself carries: a sector header
    /// line doubles as its own first field (index + constellation), a
    /// commerce header as the port name, a quick-stats or info-display line
    /// as the first (and sometimes only) stat on that screen, a density row
    /// as the first row of the scan. Pure announcement lines ("Probe
    /// entering sector N", "CIM data follows", the bare "Relative Density
    /// Scan" banner) carry no data and are skipped here.
    fn begin_mode(&self, parser: &mut Parser, line: &str) -> Result<(), CoreError> {
        match parser.mode {
            Mode::InSector | Mode::InProbeTrace => {
                parser.sector_scratch.reset();
                if let Some((index, constellation)) = core_sector::parse_header(line) {
                    let is_probe = parser.mode == Mode::InProbeTrace;
                    parser.state.begin_sector(index, is_probe);
                    if let Some(pending) = parser.state.pending_sector.as_mut() {
                        pending.sector.constellation = constellation;
                        core_sector::mark_visited(pending);
                    }
                }
                // else: bare "Probe entering sector N" announcement, no
                // sector yet — the next "Sector  : " line supplies it.
            }
            Mode::InPortReport => {
                if let Some((name, sector)) = core_port::parse_commerce_header(line) {
                    parser.state.begin_port_report(sector, name);
                }
            }
            Mode::InDensityScan => {
                let mut store = self.store.write().unwrap();
                core_cim::apply_density_row(&mut *store, line)?;
            }
            Mode::InQuickStats => {
                core_player::apply_quick_stats_line(&mut parser.state.player, line);
                self.publish_player_stats(parser)?;
            }
            Mode::InInfoDisplay => {
                if core_player::apply_info_display_line(&mut parser.state.player, line) {
                    self.publish_player_stats(parser)?;
                }
            }
            Mode::InCim | Mode::Idle | Mode::InCommerceTransaction => {}
        }
        Ok(())
    }

    fn dispatch_continue(&self, parser: &mut Parser, line: &str) -> Result<(), CoreError> {
        match parser.mode {
            Mode::InSector | Mode::InProbeTrace => {
                if let Some(pending) = parser.state.pending_sector.as_mut() {
                    core_sector::apply_line(pending, &mut parser.sector_scratch, line);
                }
            }
            Mode::InPortReport | Mode::InCommerceTransaction => {
                if let Some(report) = parser.state.pending_port.as_mut() {
                    core_port::apply_report_line(report, line);
                }
                self.apply_transaction_effect(parser, line)?;
            }
            Mode::InQuickStats => {
                core_player::apply_quick_stats_line(&mut parser.state.player, line);
                self.publish_player_stats(parser)?;
            }
            Mode::InInfoDisplay => {
                if core_player::apply_info_display_line(&mut parser.state.player, line) {
                    self.publish_player_stats(parser)?;
                }
            }
            Mode::InCim => {
                let mut store = self.store.write().unwrap();
                core_cim::apply_cim_row(&mut *store, line)?;
            }
            Mode::InDensityScan => {
                let mut store = self.store.write().unwrap();
                core_cim::apply_density_row(&mut *store, line)?;
            }
            Mode::Idle => {
                // Trade confirmations ("You bought ...") and the experience
                // line trail the commerce report *after* its closing blank
                // line has already dropped the mode back to `Idle`; they are
                // not a screen of their own, so check for them here rather
                // than inventing a dedicated mode the classifier never enters.
                if !self.apply_transaction_effect(parser, line)? {
                    tracing::debug!(target: "engine", %line, "unrecognized_line_while_idle");
                }
            }
        }
        Ok(())
    }

    /// Applies one transaction-trailer line and, the first time a trade is
    /// seen for the port-trade screen in progress, charges its single turn.
    /// Returns whether the line matched any known transaction shape.
    fn apply_transaction_effect(&self, parser: &mut Parser, line: &str) -> Result<bool, CoreError> {
        match core_player::apply_transaction_line(&mut parser.state.player, line) {
            core_player::TransactionEffect::None => Ok(false),
            core_player::TransactionEffect::Trade => {
                if !parser.traded_this_screen {
                    parser.state.player.turns -= 1;
                    parser.traded_this_screen = true;
                }
                self.publish_player_stats(parser)?;
                Ok(true)
            }
            core_player::TransactionEffect::Experience => {
                self.publish_player_stats(parser)?;
                Ok(true)
            }
        }
    }

    fn publish_player_stats(&self, parser: &mut Parser) -> Result<(), CoreError> {
        {
            let mut store = self.store.write().unwrap();
            store.save_player(&parser.state.player)?;
        }
        self.notify.player_stats_updated(&parser.state.player);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingObserver {
        sector_changes: AtomicUsize,
        stat_updates: AtomicUsize,
        port_updates: AtomicUsize,
    }

    impl Observer for CountingObserver {
        fn on_current_sector_changed(&self, _view: &core_notify::SectorView) {
            self.sector_changes.fetch_add(1, Ordering::Relaxed);
        }
        fn on_player_stats_updated(&self, _stats: &PlayerStats) {
            self.stat_updates.fetch_add(1, Ordering::Relaxed);
        }
        fn on_port_updated(&self, _view: &core_notify::PortView) {
            self.port_updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn feed(engine: &Engine, text: &str) {
        engine.process_chunk(text.as_bytes()).unwrap();
    }

    #[test]
    fn full_sector_screen_persists_and_notifies_once() {
        let engine = Engine::open(None).unwrap();
        let observer = Arc::new(CountingObserver::default());
        engine.set_observer(observer.clone());

        feed(
            &engine,
            "Sector  : 286 in Federation Space.\r\n\
             Beacon  : FedSpace, FedLaw Enforced\r\n\
             Ports   : Grav, Class 8 (Special)\r\n\
             Warps to Sector(s) :  39 - 844\r\n",
        );
        feed(&engine, "Command [TL=00:00:00]:[286] (?=Help)? :\r\n");

        assert_eq!(observer.sector_changes.load(Ordering::Relaxed), 1);
        let sector = {
            let mut store = engine.store.write().unwrap();
            store.load_sector(286).unwrap().unwrap()
        };
        assert_eq!(sector.constellation, "Federation Space");
        assert_eq!(sector.warps, [39, 844, 0, 0, 0, 0]);
        assert!(sector.port.is_some());
    }

    #[test]
    fn probe_trace_sector_does_not_notify_but_does_persist() {
        let engine = Engine::open(None).unwrap();
        let observer = Arc::new(CountingObserver::default());
        engine.set_observer(observer.clone());

        feed(
            &engine,
            "Probe entering sector 274\r\n\
             Sector  : 274 in The Fringe.\r\n\
             Warps to Sector(s) :  190 - 510\r\n",
        );
        feed(&engine, "Command [TL=00:00:00]:[2142] (?=Help)? :\r\n");

        assert_eq!(observer.sector_changes.load(Ordering::Relaxed), 0);
        let sector = {
            let mut store = engine.store.write().unwrap();
            store.load_sector(274).unwrap().unwrap()
        };
        assert_eq!(sector.warps[..2], [190, 510]);
        // the prompt's own sector is the player's, not the probed sector.
        assert_eq!(engine.player_snapshot().current_sector, 2142);
    }

    #[test]
    fn commerce_report_then_blank_line_finalizes_port() {
        let engine = Engine::open(None).unwrap();
        let observer = Arc::new(CountingObserver::default());
        engine.set_observer(observer.clone());

        feed(
            &engine,
            "Commerce report for Grav (sector 286) : Mon Jan 05, 2026\r\n\
             Fuel Ore   Selling     1234    95%\r\n\
             \r\n",
        );

        assert_eq!(observer.port_updates.load(Ordering::Relaxed), 1);
        let port = {
            let mut store = engine.store.write().unwrap();
            store.load_port(286).unwrap().unwrap()
        };
        assert_eq!(port.name, "Grav");
        assert_eq!(port.product_amount[0], 1234);
    }

    #[test]
    fn three_trades_on_one_screen_charge_exactly_one_turn() {
        let engine = Engine::open(None).unwrap();
        {
            let mut parser = engine.parser.lock().unwrap();
            parser.state.player.turns = 100;
        }

        feed(
            &engine,
            "Commerce report for Grav (sector 286) : Mon Jan 05, 2026\r\n\
             Fuel Ore   Selling     2500    100%\r\n\
             Organics   Selling     1180    100%\r\n\
             Equipment  Selling     1180    100%\r\n\
             \r\n",
        );
        feed(
            &engine,
            "You bought 2 Fuel Ore for 50 credits.\r\n\
             You bought 3 Organics for 33 credits.\r\n\
             You sold 1 Equipment for 10 credits.\r\n",
        );

        assert_eq!(engine.player_snapshot().turns, 99);
    }

    #[test]
    fn a_fresh_commerce_report_resets_the_per_screen_turn_charge() {
        let engine = Engine::open(None).unwrap();
        {
            let mut parser = engine.parser.lock().unwrap();
            parser.state.player.turns = 100;
        }

        feed(
            &engine,
            "Commerce report for Grav (sector 286) : Mon Jan 05, 2026\r\n\
             Fuel Ore   Selling     2500    100%\r\n\
             \r\n",
        );
        feed(&engine, "You bought 2 Fuel Ore for 50 credits.\r\n");

        feed(
            &engine,
            "Commerce report for Grav (sector 286) : Mon Jan 05, 2026\r\n\
             Fuel Ore   Selling     2500    100%\r\n\
             \r\n",
        );
        feed(&engine, "You bought 1 Fuel Ore for 25 credits.\r\n");

        assert_eq!(engine.player_snapshot().turns, 98);
    }

    #[test]
    fn quick_stats_line_persists_and_notifies() {
        let engine = Engine::open(None).unwrap();
        let observer = Arc::new(CountingObserver::default());
        engine.set_observer(observer.clone());

        feed(
            &engine,
            "Sect 2142  Turns 19994  Creds 374999  Figs 0  Shlds 0\r\n",
        );

        assert!(observer.stat_updates.load(Ordering::Relaxed) >= 1);
        assert_eq!(engine.player_snapshot().credits, 374_999);
    }

    #[test]
    fn chunk_boundaries_do_not_change_the_outcome() {
        let full = "Sector  : 286 in Federation Space.\r\nBeacon  : FedSpace\r\nCommand [TL=00:00:00]:[286] (?=Help)? :\r\n";
        let engine_a = Engine::open(None).unwrap();
        feed(&engine_a, full);

        let engine_b = Engine::open(None).unwrap();
        for byte in full.as_bytes() {
            engine_b.process_chunk(&[*byte]).unwrap();
        }

        let sector_a = {
            let mut store = engine_a.store.write().unwrap();
            store.load_sector(286).unwrap().unwrap()
        };
        let sector_b = {
            let mut store = engine_b.store.write().unwrap();
            store.load_sector(286).unwrap().unwrap()
        };
        assert_eq!(sector_a.beacon, sector_b.beacon);
        assert_eq!(sector_a.constellation, sector_b.constellation);
    }

    #[test]
    fn cim_row_never_fires_a_notification() {
        let engine = Engine::open(None).unwrap();
        let observer = Arc::new(CountingObserver::default());
        engine.set_observer(observer.clone());

        feed(
            &engine,
            "CIM data follows\r\n\
             3212 844 39 0 0 0 0\r\n",
        );

        assert_eq!(observer.sector_changes.load(Ordering::Relaxed), 0);
        assert_eq!(observer.stat_updates.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn from_config_with_no_database_path_runs_in_memory() {
        let config = core_config::EngineConfig::default();
        let engine = Engine::from_config(&config).unwrap();
        feed(&engine, "Sector  : 1 in Federation Space.\r\n");
        engine.finalize().unwrap();
        assert!(engine.load_sector(1).unwrap().is_some());
    }

    #[test]
    fn reopening_the_same_database_file_preserves_persisted_state() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.db");

        {
            let engine = Engine::open(Some(&path)).unwrap();
            feed(&engine, "Sector  : 42 in Federation Space.\r\n");
            engine.finalize().unwrap();
        }

        let engine = Engine::open(Some(&path)).unwrap();
        assert!(engine.load_sector(42).unwrap().is_some());
    }
}
