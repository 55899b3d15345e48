//! Sector snapshot finalizer (`spec.md` §4.G): folds a [`PendingSector`] or
//! [`PendingPortReport`] into persisted state and fires the matching
//! notification, once a screen boundary forces the commit.

use crate::pending::{PendingPortReport, PendingSector};
use crate::state::GameState;
use crate::store::{SectorStore, StoreError};
use crate::types::{Explored, Port, Sector, Trader};
use core_notify::{NotificationBus, PortView, SectorView, TraderInfo, TraderUpdate};

fn sector_view(sector: &Sector) -> SectorView {
    SectorView {
        number: sector.index,
        nav_haz: sector.nav_haz,
        has_traders: sector.traders.len() as i32,
        constellation: sector.constellation.clone(),
        beacon: sector.beacon.clone(),
        warps: sector.warps[..sector.warps_count as usize].to_vec(),
        has_port: sector.port.is_some(),
    }
}

fn trader_info(trader: &Trader) -> TraderInfo {
    TraderInfo {
        name: trader.name.clone(),
        figs: trader.figs,
        ship_name: trader.ship_name.clone(),
        ship_type: trader.ship_type.clone(),
    }
}

/// Merge `pending` onto `existing` (or a fresh null sector), enforcing
/// invariant 1 (explored status never decreases) and the replace-not-merge
/// rule for planets/traders/ships.
///
/// Invariant 2 (`spec.md` §3/§4.G): a sector view with no `Ports   :` line
/// clears any persisted port — but only when the mode was `InSector`. A
/// probe trace showing no port line says nothing about the port (probes
/// report topology, not full sector intelligence) and must leave it alone.
fn merge_sector(existing: Option<Sector>, pending: PendingSector) -> Sector {
    let mut merged = pending.sector;
    let prior_explored = existing.as_ref().map(|s| s.explored).unwrap_or(Explored::None);
    merged.explored = std::cmp::max(prior_explored, merged.explored);

    let prior_port: Option<Port> = existing.and_then(|s| s.port);
    if pending.saw_ports_line {
        if let Some(mut new_port) = merged.port.take() {
            if let Some(prior) = prior_port {
                if prior.name == new_port.name {
                    new_port.buy_product = prior.buy_product;
                    new_port.product_amount = prior.product_amount;
                    new_port.product_percent = prior.product_percent;
                    new_port.build_time = prior.build_time;
                }
            }
            merged.port = Some(new_port);
        }
        // else: the line reported no port — merged.port stays None, cleared below.
    } else if pending.is_probe {
        merged.port = prior_port;
    } else {
        merged.port = None;
    }

    merged
}

/// Commits the sector currently being assembled, if any. A no-op if nothing
/// is pending. Persistence happens before notification so observers never
/// see a view that outruns storage.
pub fn finalize_sector(
    state: &mut GameState,
    store: &mut dyn SectorStore,
    notify: &NotificationBus,
) -> Result<(), StoreError> {
    let Some(pending) = state.pending_sector.take() else {
        return Ok(());
    };
    let index = pending.sector.index;
    let is_probe = pending.is_probe;

    let existing = store.load_sector(index)?;
    let merged = merge_sector(existing, pending);
    let clear_port = !is_probe && merged.port.is_none();
    store.save_sector(&merged)?;
    // The sector row's embedded `port_*` columns are the source of a port
    // learned purely from a `Ports   :` line; mirror it into the dedicated
    // `ports` table too, or `load_port` never sees a port that never went
    // through a commerce report.
    if let Some(port) = &merged.port {
        store.save_port(index, port)?;
    } else if clear_port {
        store.clear_port(index)?;
    }

    if !is_probe {
        notify.current_sector_changed(&sector_view(&merged));
        notify.sector_updated(&sector_view(&merged));
        if !merged.traders.is_empty() {
            notify.trader_data_updated(&TraderUpdate {
                sector: merged.index,
                traders: merged.traders.iter().map(trader_info).collect(),
            });
        }
    }
    Ok(())
}

/// Commits the port report currently being assembled, if any.
///
/// A commerce report's grammar only ever carries a name and the three
/// product rows (`core-port`) — `class_index`/`build_time`/`dead` come
/// exclusively from a sector screen's `Ports   :` line. Overwriting the
/// persisted port outright would erase that metadata every time a trader
/// re-checks the port without re-displaying the sector, so those fields are
/// carried over from whatever is already on file for the same port name.
pub fn finalize_port(
    state: &mut GameState,
    store: &mut dyn SectorStore,
    notify: &NotificationBus,
) -> Result<(), StoreError> {
    let Some(pending) = state.pending_port.take() else {
        return Ok(());
    };
    let PendingPortReport { sector, mut port } = pending;

    let mut persisted = store.load_sector(sector)?.unwrap_or_else(|| Sector::null(sector));
    let prior_port = store.load_port(sector)?.or_else(|| persisted.port.clone());
    if let Some(prior) = prior_port {
        if prior.name == port.name {
            port.class_index = prior.class_index;
            port.build_time = prior.build_time;
            port.dead = prior.dead;
        }
    }

    store.save_port(sector, &port)?;
    persisted.port = Some(port.clone());
    store.save_sector(&persisted)?;

    notify.port_updated(&PortView {
        sector_id: sector,
        name: port.name,
        class_type: port.class_index,
    });
    Ok(())
}
