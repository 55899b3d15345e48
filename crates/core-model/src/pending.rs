//! In-progress snapshots accumulated while a screen is still streaming in.
//! Finalized into persisted state by [`crate::finalize::finalize_sector`].

use crate::types::{Planet, Port, Sector, Ship, Trader};

/// Accumulates a `Sector :` (or probe-trace) screen until a boundary forces
/// its commit. `saw_ports_line` distinguishes "no `Ports` line appeared" (do
/// not touch the persisted port) from "a `Ports` line said none exist" (must
/// clear it) — invariant 2 in `spec.md` §4.G.
#[derive(Debug, Clone)]
pub struct PendingSector {
    pub sector: Sector,
    pub saw_ports_line: bool,
    pub is_probe: bool,
}

impl PendingSector {
    pub fn new(index: u32, is_probe: bool) -> Self {
        Self {
            sector: Sector::null(index),
            saw_ports_line: false,
            is_probe,
        }
    }

    pub fn push_trader(&mut self, trader: Trader) {
        self.sector.traders.push(trader);
    }

    pub fn push_ship(&mut self, ship: Ship) {
        self.sector.ships.push(ship);
    }

    pub fn push_planet(&mut self, planet: Planet) {
        self.sector.planets.push(planet);
    }
}

/// Accumulates a `Commerce report for` screen. Kept separate from
/// `PendingSector` because a port report can arrive with no sector screen
/// preceding it in the same command's output (a trader docking and checking
/// the port again without re-displaying the sector).
#[derive(Debug, Clone)]
pub struct PendingPortReport {
    pub sector: u32,
    pub port: Port,
}

impl PendingPortReport {
    pub fn new(sector: u32, port_name: String) -> Self {
        let mut port = Port::empty();
        port.name = port_name;
        Self { sector, port }
    }
}
