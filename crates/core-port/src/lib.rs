//! Port Parser (`spec.md` §4.D, mode `InPortReport`).
//!
//! Commerce report identification and per-commodity product lines. Trade
//! transaction deltas feed the same [`core_model::types::ScriptValue`]-free
//! player snapshot as the info display and quick-stats grammars, so that
//! logic lives in `core-player` rather than here.

use core_model::PendingPortReport;

const PRODUCT_NAMES: [&str; 3] = ["Fuel Ore", "Organics", "Equipment"];

/// Parses `Commerce report for <name> (sector <N>) : <timestamp>` into
/// (port name, sector). The trailing timestamp is not retained.
pub fn parse_commerce_header(line: &str) -> Option<(String, u32)> {
    let rest = line.strip_prefix("Commerce report for ")?;
    let (name, tail) = rest.split_once(" (sector ")?;
    let (sector_str, _timestamp) = tail.split_once(')')?;
    let sector: u32 = sector_str.trim().parse().ok()?;
    Some((name.trim().to_string(), sector))
}

fn product_index(line: &str) -> Option<usize> {
    PRODUCT_NAMES.iter().position(|name| line.trim_start().starts_with(name))
}

/// Parses one product line (`<Item>   <Buying|Selling>  <amount>    <percent>%`)
/// into the product's index and its buy flag/amount/percent.
fn parse_product_line(line: &str) -> Option<(usize, bool, i64, i32)> {
    let idx = product_index(line)?;
    let rest = line.trim_start().strip_prefix(PRODUCT_NAMES[idx])?;
    let mut tokens = rest.split_whitespace();
    let verb = tokens.next()?;
    let buying = verb.eq_ignore_ascii_case("buying");
    let amount: i64 = tokens.next()?.replace(',', "").parse().ok()?;
    let percent_tok = tokens.next()?;
    let percent: i32 = percent_tok.trim_end_matches('%').parse().ok()?;
    Some((idx, buying, amount, percent))
}

/// Applies a non-header line of an open commerce report to `report.port`.
/// Lines that aren't a recognized product row are logged and skipped
/// (`ParseSkip`, `spec.md` §7) — callers keep dispatching subsequent lines.
pub fn apply_report_line(report: &mut PendingPortReport, line: &str) {
    match parse_product_line(line) {
        Some((idx, buying, amount, percent)) => {
            report.port.buy_product[idx] = buying;
            report.port.product_amount[idx] = amount;
            report.port.product_percent[idx] = percent;
        }
        None => tracing::debug!(target: "port", line, "unrecognized commerce report line"),
    }
}
