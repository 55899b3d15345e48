//! Player/Stats Parser (`spec.md` §4.E) plus trade-outcome deltas
//! (`spec.md` §4.D's transaction half — both write the same snapshot, so
//! they share the grammar here rather than living in `core-port`).
//!
//! Two line shapes are not given verbatim upstream and are therefore
//! documented, invented grammars (see `DESIGN.md`): the trade-outcome line
//! and the experience-earned line. A port-trade screen costs exactly one
//! turn regardless of how many commodities it moves, so this crate only
//! reports *what kind* of line it saw ([`TransactionEffect`]) — charging the
//! turn once per screen is `core-engine`'s job, since only the engine knows
//! where one screen ends and the next begins.

use core_notify::PlayerStats;

/// Extracts the last contiguous run of digits in `s` (e.g. `" for 83 "` -> 83).
fn parse_trailing_int(s: &str) -> Option<i64> {
    let mut end = s.len();
    let bytes = s.as_bytes();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == end {
        return None;
    }
    s[start..end].parse().ok()
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Parses one line of the multi-line info display, mutating `stats` in
/// place. Returns `false` for a line that matched none of the known labels
/// (`ParseSkip`, `spec.md` §7).
pub fn apply_info_display_line(stats: &mut PlayerStats, line: &str) -> bool {
    let trimmed = line.trim();
    let Some((label, value)) = trimmed.split_once(':') else {
        return false;
    };
    let label = label.trim();
    let value = value.trim();

    match label {
        "Credits" => stats.credits = parse_leading_int(value).unwrap_or(stats.credits),
        "Turns left" => stats.turns = parse_leading_int(value).unwrap_or(stats.turns),
        "Fighters" => stats.fighters = parse_leading_int(value).unwrap_or(stats.fighters),
        "Shields" => stats.shields = parse_leading_int(value).unwrap_or(stats.shields),
        "Ether Probes" => stats.eprobes = parse_leading_int(value).unwrap_or(0) as i32,
        "Photon Missiles" => stats.photons = parse_leading_int(value).unwrap_or(0) as i32,
        "Armid Mines" => stats.armid_mines = parse_leading_int(value).unwrap_or(0) as i32,
        "Limpet Mines" => stats.limpet_mines = parse_leading_int(value).unwrap_or(0) as i32,
        "Genesis Torps" => stats.genesis_torps = parse_leading_int(value).unwrap_or(0) as i32,
        "Cloaking Device" => stats.cloaks = parse_leading_int(value).unwrap_or(0) as i32,
        "Corbomite" => stats.corbomite = parse_leading_int(value).unwrap_or(0) as i32,
        "Mine Disruptor" => stats.mine_disruptors = parse_leading_int(value).unwrap_or(0) as i32,
        "Ship Name" => {}
        "Rank and Exp" => {
            stats.experience = parse_leading_int(value).unwrap_or(stats.experience);
            if let Some(idx) = value.find("Alignment=") {
                stats.alignment = parse_leading_int(&value[idx + "Alignment=".len()..]).unwrap_or(stats.alignment);
            }
        }
        "Total Holds" => apply_holds_breakdown(stats, value),
        _ => return false,
    }
    true
}

fn apply_holds_breakdown(stats: &mut PlayerStats, value: &str) {
    let (total, breakdown) = match value.split_once('-') {
        Some((t, b)) => (t, b),
        None => (value, ""),
    };
    stats.total_holds = parse_leading_int(total).unwrap_or(stats.total_holds) as i32;

    let mut empty_observed = None;
    for field in breakdown.split_whitespace() {
        let Some((name, n)) = field.split_once('=') else {
            continue;
        };
        let n = parse_leading_int(n).unwrap_or(0) as i32;
        match name {
            "Fuel" | "Ore" => stats.ore_holds = n,
            "Organics" => stats.org_holds = n,
            "Equipment" => stats.equ_holds = n,
            "Colonist" | "Colonists" => stats.col_holds = n,
            "Empty" => empty_observed = Some(n),
            _ => {}
        }
    }
    if let Some(empty) = empty_observed {
        let derived = stats.empty_holds();
        if derived != empty {
            tracing::warn!(
                target: "player",
                derived,
                reported = empty,
                "InconsistentSnapshot: reported empty holds do not match total minus cargo"
            );
        }
    }
}

const QUICK_STATS_LABELS: &[&str] = &["Sect", "Turns", "Creds", "Figs", "Shlds", "Holds", "Ore", "Org", "Equ", "Col", "Ftr"];

/// Tokenizes a compact quick-stats line into whitespace-delimited `Label
/// Value` pairs scanned left to right. An unrecognized label is a per-token
/// skip, not a whole-line failure (resolves open question 1 in `spec.md`).
pub fn apply_quick_stats_line(stats: &mut PlayerStats, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0;
    while i + 1 < tokens.len() {
        let label = tokens[i];
        let value = tokens[i + 1];
        if !QUICK_STATS_LABELS.contains(&label) {
            i += 1;
            continue;
        }
        let n = value.parse::<i64>().unwrap_or(0);
        match label {
            "Sect" => stats.current_sector = n as u32,
            "Turns" => stats.turns = n,
            "Creds" => stats.credits = n,
            "Figs" | "Ftr" => stats.fighters = n,
            "Shlds" => stats.shields = n,
            "Holds" => stats.total_holds = n as i32,
            "Ore" => stats.ore_holds = n as i32,
            "Org" => stats.org_holds = n as i32,
            "Equ" => stats.equ_holds = n as i32,
            "Col" => stats.col_holds = n as i32,
            _ => {}
        }
        i += 2;
    }
}

const PRODUCT_NAMES: [&str; 3] = ["Fuel Ore", "Organics", "Equipment"];

/// What a transaction-trailer line turned out to be, distinguishing a trade
/// (which costs the screen a turn) from an experience line (which doesn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEffect {
    /// The line didn't match any known transaction shape.
    None,
    /// A buy or sell line; holds and credits were already applied.
    Trade,
    /// An experience-earned line; experience was already applied.
    Experience,
}

/// Applies a trade-outcome line to `stats` additively. Later absolute lines
/// (info display, quick stats) always overwrite whatever a trade delta
/// produced — last-observed-wins (resolves open question 2). Does not touch
/// `turns`; see [`TransactionEffect::Trade`].
pub fn apply_transaction_line(stats: &mut PlayerStats, line: &str) -> TransactionEffect {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("You bought ") {
        if let Some((qty, product, credits)) = parse_trade(rest) {
            add_holds(stats, product, qty);
            stats.credits -= credits;
            return TransactionEffect::Trade;
        }
    }
    if let Some(rest) = trimmed.strip_prefix("You sold ") {
        if let Some((qty, product, credits)) = parse_trade(rest) {
            add_holds(stats, product, -qty);
            stats.credits += credits;
            return TransactionEffect::Trade;
        }
    }
    if let Some(rest) = trimmed.strip_prefix("You have earned ") {
        if let Some(n) = parse_leading_int(rest) {
            stats.experience += n;
            return TransactionEffect::Experience;
        }
    }
    TransactionEffect::None
}

fn parse_trade(rest: &str) -> Option<(i64, usize, i64)> {
    let qty = parse_leading_int(rest)?;
    let product_idx = PRODUCT_NAMES.iter().position(|name| rest.contains(name))?;
    let (_, after_product) = rest.split_once(PRODUCT_NAMES[product_idx])?;
    let credits = parse_trailing_int(after_product.split("credits").next().unwrap_or(""))?;
    Some((qty, product_idx, credits))
}

fn add_holds(stats: &mut PlayerStats, product_idx: usize, delta: i64) {
    match product_idx {
        0 => stats.ore_holds += delta as i32,
        1 => stats.org_holds += delta as i32,
        2 => stats.equ_holds += delta as i32,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_display_credits_and_turns() {
        let mut stats = PlayerStats::default();
        assert!(apply_info_display_line(&mut stats, "Credits         : 374999"));
        assert!(apply_info_display_line(&mut stats, "Turns left: 19994"));
        assert_eq!(stats.credits, 374999);
        assert_eq!(stats.turns, 19994);
    }

    #[test]
    fn info_display_holds_breakdown_matches_empty_derivation() {
        let mut stats = PlayerStats::default();
        stats.total_holds = 20;
        apply_info_display_line(
            &mut stats,
            "Total Holds: 20 - Fuel Ore=2 Organics=3 Equipment=0 Colonist=0 Empty=15",
        );
        assert_eq!(stats.ore_holds, 2);
        assert_eq!(stats.org_holds, 3);
        assert_eq!(stats.empty_holds(), 15);
    }

    #[test]
    fn unrecognized_info_line_is_a_parse_skip() {
        let mut stats = PlayerStats::default();
        assert!(!apply_info_display_line(&mut stats, "Nonsense line with no colon"));
    }

    #[test]
    fn quick_stats_line_assigns_known_tokens_and_skips_unknown() {
        let mut stats = PlayerStats::default();
        apply_quick_stats_line(&mut stats, "Sect 2142  Turns 19994  Creds 374999  Figs 0  Shlds 0  Bogus xyz");
        assert_eq!(stats.current_sector, 2142);
        assert_eq!(stats.turns, 19994);
        assert_eq!(stats.credits, 374999);
    }

    #[test]
    fn buy_transaction_applies_additive_delta() {
        let mut stats = PlayerStats::default();
        stats.credits = 374_999;
        stats.turns = 19_994;
        let effect = apply_transaction_line(&mut stats, "You bought 2 Fuel Ore for 83 credits.");
        assert_eq!(effect, TransactionEffect::Trade);
        assert_eq!(stats.ore_holds, 2);
        assert_eq!(stats.credits, 374_999 - 83);
        // Turn-charging is the caller's job, once per screen, not per line.
        assert_eq!(stats.turns, 19_994);
    }

    #[test]
    fn sell_transaction_applies_additive_delta() {
        let mut stats = PlayerStats::default();
        stats.credits = 100;
        stats.ore_holds = 5;
        let effect = apply_transaction_line(&mut stats, "You sold 5 Fuel Ore for 250 credits.");
        assert_eq!(effect, TransactionEffect::Trade);
        assert_eq!(stats.ore_holds, 0);
        assert_eq!(stats.credits, 350);
    }

    #[test]
    fn experience_line_reports_experience_effect() {
        let mut stats = PlayerStats::default();
        let effect = apply_transaction_line(&mut stats, "You have earned 4 experience points.");
        assert_eq!(effect, TransactionEffect::Experience);
        assert_eq!(stats.experience, 4);
    }

    #[test]
    fn later_absolute_line_overwrites_prior_delta() {
        let mut stats = PlayerStats::default();
        apply_transaction_line(&mut stats, "You bought 2 Fuel Ore for 83 credits.");
        apply_info_display_line(&mut stats, "Credits         : 500000");
        assert_eq!(stats.credits, 500000);
    }
}
