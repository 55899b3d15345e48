//! CIM / Density Parser (`spec.md` §4.F).
//!
//! Both line families are background data: they mutate persisted sectors
//! directly (there is no pending-snapshot screen to commit) and never fire
//! a sector-changed notification — property P7.

use core_model::types::{Explored, Sector};
use core_model::{SectorStore, StoreError};

fn parse_cim_row(line: &str) -> Option<(u32, Vec<u32>)> {
    let mut tokens = line.split_whitespace();
    let sector: u32 = tokens.next()?.parse().ok()?;
    let warps: Vec<u32> = tokens.filter_map(|t| t.parse().ok()).collect();
    if warps.is_empty() {
        return None;
    }
    Some((sector, warps))
}

/// Applies one CIM dump row: create/update the sector's warps, raising
/// `explored` to at least `Calc` without ever lowering it.
pub fn apply_cim_row(store: &mut dyn SectorStore, line: &str) -> Result<(), StoreError> {
    let Some((index, warp_list)) = parse_cim_row(line) else {
        tracing::debug!(target: "cim", line, "unrecognized CIM row");
        return Ok(());
    };
    let mut sector = store.load_sector(index)?.unwrap_or_else(|| Sector::null(index));
    let mut warps = [0u32; 6];
    for (slot, w) in warp_list.iter().take(6).enumerate() {
        warps[slot] = *w;
    }
    sector.warps = warps;
    sector.warps_count = warp_list.len().min(6) as u32;
    sector.explored = std::cmp::max(sector.explored, Explored::Calc);
    store.save_sector(&sector)
}

struct DensityRow {
    sector: u32,
    density: i64,
    warps_count: u32,
    nav_haz: i32,
    anomaly: bool,
}

fn parse_density_row(line: &str) -> Option<DensityRow> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix("Sector")?;
    let (sector_str, rest) = rest.split_once("==>")?;
    let sector: u32 = sector_str.trim().parse().ok()?;
    let (density_str, rest) = rest.split_once("Warps :")?;
    let density: i64 = density_str.trim().parse().ok()?;
    let (warps_str, rest) = rest.split_once("NavHaz :")?;
    let warps_count: u32 = warps_str.trim().parse().ok()?;
    let (nav_haz_str, rest) = rest.split_once('%')?;
    let nav_haz: i32 = nav_haz_str.trim().parse().ok()?;
    let anomaly = rest.contains("Anom : Yes");
    Some(DensityRow {
        sector,
        density,
        warps_count,
        nav_haz,
        anomaly,
    })
}

/// Applies one density-scan row. A never-before-seen sector gets the
/// `"??? (Density only)"` constellation sentinel and `explored := Density`;
/// an already-known sector keeps its constellation and only rises to
/// `Density` if its current status is lower (invariant 1).
pub fn apply_density_row(store: &mut dyn SectorStore, line: &str) -> Result<(), StoreError> {
    let Some(row) = parse_density_row(line) else {
        tracing::debug!(target: "cim", line, "unrecognized density scan row");
        return Ok(());
    };
    let existing = store.load_sector(row.sector)?;
    let mut sector = existing.unwrap_or_else(|| {
        let mut s = Sector::null(row.sector);
        s.constellation = "??? (Density only)".to_string();
        s
    });
    sector.density = row.density;
    sector.warps_count = row.warps_count;
    sector.nav_haz = row.nav_haz;
    sector.anomaly = row.anomaly;
    sector.explored = std::cmp::max(sector.explored, Explored::Density);
    store.save_sector(&sector)
}
