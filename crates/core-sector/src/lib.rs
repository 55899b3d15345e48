//! Sector Parser (`spec.md` §4.C, mode `InSector`/`InProbeTrace`).
//!
//! Line-by-line mutation of a [`PendingSector`] already created by the
//! caller on the header line. Multi-line records (traders, ships) need a
//! scratch buffer across calls; [`Scratch`] holds that, separate from
//! `PendingSector` so `core-model` stays free of parser-internal state.

use core_model::types::{Explored, FighterKind, Fighters, MinesArmid, MinesLimpet, Planet, Port, Ship, Trader};
use core_model::PendingSector;

#[derive(Debug, Default)]
struct PartialTrader {
    name: String,
    figs: i64,
}

#[derive(Debug, Default)]
struct PartialShip {
    name: String,
    owner: String,
    figs: i64,
}

/// Cross-line state for records whose fields are split over two lines.
#[derive(Debug, Default)]
pub struct Scratch {
    pending_trader: Option<PartialTrader>,
    pending_ship: Option<PartialShip>,
    awaiting_planet_continuation: bool,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset at the start of every new sector snapshot.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parses `Sector  : <N> in <constellation>.` into (index, constellation).
/// The header line itself starts a new snapshot — called by the engine
/// before [`apply_line`] sees any further lines of this screen.
pub fn parse_header(line: &str) -> Option<(u32, String)> {
    let rest = line.strip_prefix("Sector  : ")?;
    let (num, tail) = rest.split_once(" in ")?;
    let index: u32 = num.trim().parse().ok()?;
    let constellation = tail.trim().trim_end_matches('.').to_string();
    Some((index, constellation))
}

fn parse_port_line(rest: &str) -> Option<Port> {
    let (name, tail) = rest.split_once(", Class ")?;
    let tail = tail.trim();
    let (class_str, pattern) = tail.split_once(' ')?;
    let class_index: u8 = class_str.trim().parse().ok()?;
    let pattern = pattern.trim().trim_start_matches('(').trim_end_matches(')');
    let mut port = Port::empty();
    port.name = name.trim().to_string();
    port.class_index = class_index;
    for (i, c) in pattern.chars().take(3).enumerate() {
        port.buy_product[i] = c.eq_ignore_ascii_case(&'b');
    }
    Some(port)
}

fn parse_under_construction(trimmed: &str) -> Option<i32> {
    let rest = trimmed.strip_prefix("(Under Construction")?;
    let rest = rest.trim_start_matches(|c: char| c == '-' || c.is_whitespace());
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn parse_first_int(s: &str) -> Option<i64> {
    let digits: String = s
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit() && *c != '-')
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

fn parse_paren_content(s: &str) -> Option<&str> {
    let start = s.find('(')? + 1;
    let end = s[start..].find(')')? + start;
    Some(&s[start..end])
}

fn parse_fighters(rest: &str) -> Option<Fighters> {
    let qty = parse_first_int(rest)?;
    let owner = parse_paren_content(rest)?.to_string();
    let after_owner = &rest[rest.find(')')? + 1..];
    let kind = if after_owner.contains("Toll") {
        FighterKind::Toll
    } else if after_owner.contains("Offensive") {
        FighterKind::Offensive
    } else {
        FighterKind::Defensive
    };
    Some(Fighters { qty, owner, kind })
}

fn parse_warps(rest: &str) -> ([u32; 6], u32) {
    let mut warps = [0u32; 6];
    let mut count = 0u32;
    for token in rest.split('-') {
        if count as usize >= warps.len() {
            break;
        }
        let token = token.trim().trim_start_matches('(').trim_end_matches(')');
        if let Ok(n) = token.parse::<u32>() {
            warps[count as usize] = n;
            count += 1;
        }
    }
    (warps, count)
}

fn is_known_prefix(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("Beacon  :")
        || trimmed.starts_with("Ports   :")
        || trimmed.starts_with("Planets :")
        || trimmed.starts_with("Traders :")
        || trimmed.starts_with("Ships   :")
        || trimmed.starts_with("Fighters:")
        || trimmed.starts_with("NavHaz  :")
        || trimmed.starts_with("Mines   :")
        || trimmed.starts_with("Warps to Sector")
        || trimmed.starts_with("(Under Construction")
}

/// Applies one in-screen line to the pending snapshot. `pending.sector`'s
/// scalar fields overwrite on each assignment (last-observed-within-snapshot
/// wins, per invariant/tie-break in `spec.md` §4.C); list fields only grow.
pub fn apply_line(pending: &mut PendingSector, scratch: &mut Scratch, line: &str) {
    let trimmed = line.trim_start();

    if let Some(partial) = scratch.pending_trader.take() {
        if let Some(rest) = trimmed.strip_prefix("in ") {
            if let Some(ship_type) = parse_paren_content(rest) {
                let ship_name = rest[..rest.find('(').unwrap_or(rest.len())].trim().to_string();
                pending.push_trader(Trader {
                    name: partial.name,
                    figs: partial.figs,
                    ship_name,
                    ship_type: ship_type.to_string(),
                });
                return;
            }
        }
        // Malformed continuation: drop the partial record and fall through.
        tracing::debug!(target: "sector", "trader continuation line unrecognized, dropping partial record");
    }

    if let Some(partial) = scratch.pending_ship.take() {
        if trimmed.starts_with('(') && trimmed.ends_with(')') {
            let ship_type = trimmed.trim_start_matches('(').trim_end_matches(')').to_string();
            pending.push_ship(Ship {
                name: partial.name,
                owner: partial.owner,
                figs: partial.figs,
                ship_type,
            });
            return;
        }
        tracing::debug!(target: "sector", "ship continuation line unrecognized, dropping partial record");
    }

    if scratch.awaiting_planet_continuation {
        if line != trimmed && !trimmed.is_empty() && !is_known_prefix(line) {
            pending.push_planet(Planet { name: trimmed.to_string() });
            return;
        }
        scratch.awaiting_planet_continuation = false;
    }

    if let Some(rest) = trimmed.strip_prefix("Beacon  :") {
        pending.sector.beacon = rest.trim().to_string();
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Ports   :") {
        pending.saw_ports_line = true;
        pending.sector.port = parse_port_line(rest.trim());
        return;
    }

    if let Some(days) = parse_under_construction(trimmed) {
        if let Some(port) = pending.sector.port.as_mut() {
            port.build_time = days;
        }
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Planets :") {
        pending.push_planet(Planet { name: rest.trim().to_string() });
        scratch.awaiting_planet_continuation = true;
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Traders :") {
        if let Some((name, tail)) = rest.split_once(", w/") {
            let figs = parse_first_int(tail).unwrap_or(0);
            scratch.pending_trader = Some(PartialTrader {
                name: name.trim().to_string(),
                figs,
            });
        }
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Ships   :") {
        if let Some((name, tail)) = rest.split_once(", w/") {
            let figs = parse_first_int(tail).unwrap_or(0);
            let (name, owner) = match name.split_once("Owned by") {
                Some((n, o)) => (n.trim(), o.trim()),
                None => (name.trim(), ""),
            };
            scratch.pending_ship = Some(PartialShip {
                name: name.trim_end_matches(',').to_string(),
                owner: owner.to_string(),
                figs,
            });
        }
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Fighters:") {
        pending.sector.fighters = parse_fighters(rest);
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("NavHaz  :") {
        pending.sector.nav_haz = parse_first_int(rest).unwrap_or(0) as i32;
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Mines   :") {
        let qty = parse_first_int(rest).unwrap_or(0);
        let paren = parse_paren_content(rest).unwrap_or("");
        let after_first = rest.get(rest.find(')').map(|i| i + 1).unwrap_or(rest.len())..).unwrap_or("");
        let owner = parse_paren_content(after_first).unwrap_or("").to_string();
        if paren.contains("Armid") {
            pending.sector.mines_armid = Some(MinesArmid { qty, owner });
        } else if paren.contains("Limpet") {
            pending.sector.mines_limpet = Some(MinesLimpet { qty, owner });
        }
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("Warps to Sector") {
        let rest = rest.trim_start_matches("(s)").trim_start();
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        let (warps, count) = parse_warps(rest);
        pending.sector.warps = warps;
        pending.sector.warps_count = count;
        return;
    }

    tracing::debug!(target: "sector", line, "unrecognized line in sector screen");
}

/// Marks the snapshot as fully visited. Called once, for the header line,
/// by the engine right after `parse_header`.
pub fn mark_visited(pending: &mut PendingSector) {
    pending.sector.explored = Explored::Holo;
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::PendingSector;

    #[test]
    fn parses_header_and_trims_trailing_period() {
        let (index, constellation) = parse_header("Sector  : 286 in Federation Space.").unwrap();
        assert_eq!(index, 286);
        assert_eq!(constellation, "Federation Space");
    }

    #[test]
    fn parses_beacon_and_navhaz() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Beacon  : FedSpace, Federation Law Enforced");
        apply_line(&mut pending, &mut scratch, "NavHaz  : 0%");
        assert_eq!(pending.sector.beacon, "FedSpace, Federation Law Enforced");
        assert_eq!(pending.sector.nav_haz, 0);
    }

    #[test]
    fn parses_ports_line_with_class_pattern() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Ports   : Grav, Class 7 (SSS)");
        let port = pending.sector.port.as_ref().unwrap();
        assert_eq!(port.name, "Grav");
        assert_eq!(port.class_index, 7);
        assert_eq!(port.buy_product, [false, false, false]);
        assert!(pending.saw_ports_line);
    }

    #[test]
    fn under_construction_sets_build_time_on_current_port() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Ports   : Grav, Class 7 (SSS)");
        apply_line(&mut pending, &mut scratch, "          (Under Construction - 5 days left)");
        assert_eq!(pending.sector.port.as_ref().unwrap().build_time, 5);
    }

    #[test]
    fn parses_warps_preserving_undiscovered_slots() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(
            &mut pending,
            &mut scratch,
            "Warps to Sector(s) :  39 - 844 - (900) - 12",
        );
        assert_eq!(pending.sector.warps, [39, 844, 900, 12, 0, 0]);
        assert_eq!(pending.sector.warps_count, 4);
    }

    #[test]
    fn parses_trader_across_continuation_line() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Traders : Wily Trader, w/ 4000 ftrs,");
        apply_line(&mut pending, &mut scratch, "           in Big Hauler (Imperial StarShip)");
        assert_eq!(pending.sector.traders.len(), 1);
        let trader = &pending.sector.traders[0];
        assert_eq!(trader.name, "Wily Trader");
        assert_eq!(trader.figs, 4000);
        assert_eq!(trader.ship_name, "Big Hauler");
        assert_eq!(trader.ship_type, "Imperial StarShip");
    }

    #[test]
    fn parses_ship_across_continuation_line() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(
            &mut pending,
            &mut scratch,
            "Ships   : Marauder, Owned by Black Beard, w/ 200 ftrs,",
        );
        apply_line(&mut pending, &mut scratch, "           (Corporate Flagship)");
        assert_eq!(pending.sector.ships.len(), 1);
        let ship = &pending.sector.ships[0];
        assert_eq!(ship.name, "Marauder");
        assert_eq!(ship.owner, "Black Beard");
        assert_eq!(ship.figs, 200);
        assert_eq!(ship.ship_type, "Corporate Flagship");
    }

    #[test]
    fn parses_multiple_planet_lines() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Planets : Alpha");
        apply_line(&mut pending, &mut scratch, "          Beta");
        apply_line(&mut pending, &mut scratch, "          Gamma");
        assert_eq!(pending.sector.planets.len(), 3);
        assert_eq!(pending.sector.planets[2].name, "Gamma");
    }

    #[test]
    fn parses_fighters_and_mines() {
        let mut pending = PendingSector::new(286, false);
        let mut scratch = Scratch::new();
        apply_line(&mut pending, &mut scratch, "Fighters: 500 (Federation) Defensive");
        apply_line(&mut pending, &mut scratch, "Mines   : 10 (Type 1 Armid) (Some Player)");
        assert_eq!(pending.sector.fighters.as_ref().unwrap().qty, 500);
        assert_eq!(pending.sector.fighters.as_ref().unwrap().kind, FighterKind::Defensive);
        assert_eq!(pending.sector.mines_armid.as_ref().unwrap().owner, "Some Player");
    }
}
