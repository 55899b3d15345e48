//! Persistence Layer (`spec.md` §4.H): a `rusqlite`-backed relational store
//! implementing `core_model::SectorStore`. Every multi-statement write for
//! one logical operation runs inside a single transaction via [`Store::with_txn`];
//! any failure rolls back and surfaces as [`core_model::StoreError`].

mod migrations;

use core_model::types::{Explored, FighterKind, Fighters, MinesArmid, MinesLimpet, Planet, Port, ScriptValue, Sector, Ship, Trader};
use core_model::{SectorStore, StoreError};
use core_notify::PlayerStats;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for OpenError {
    fn from(e: rusqlite::Error) -> Self {
        OpenError::Storage(e.to_string())
    }
}

fn to_storage_err(e: rusqlite::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn explored_to_i64(e: Explored) -> i64 {
    match e {
        Explored::None => 0,
        Explored::Calc => 1,
        Explored::Density => 2,
        Explored::Holo => 3,
    }
}

fn explored_from_i64(n: i64) -> Explored {
    match n {
        1 => Explored::Calc,
        2 => Explored::Density,
        3 => Explored::Holo,
        _ => Explored::None,
    }
}

fn fighter_kind_to_i64(k: FighterKind) -> i64 {
    match k {
        FighterKind::Toll => 0,
        FighterKind::Defensive => 1,
        FighterKind::Offensive => 2,
    }
}

fn fighter_kind_from_i64(n: i64) -> FighterKind {
    match n {
        0 => FighterKind::Toll,
        2 => FighterKind::Offensive,
        _ => FighterKind::Defensive,
    }
}

/// `updated_at` (invariant 3) is the one place the store touches wall-clock
/// time; nothing in `tests/properties.rs` asserts on its value.
fn now_rfc3339() -> String {
    let now = std::time::SystemTime::now();
    match now.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => d.as_secs().to_string(),
        Err(_) => "0".to_string(),
    }
}

/// A `rusqlite` connection plus its migration state. Not internally
/// thread-safe — `core-engine` wraps it in an `RwLock` per `spec.md` §5.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Creates a new database file, applying the full schema.
    pub fn create(path: &Path) -> Result<Self, OpenError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Opens a transient in-memory database, for tests and for engines run
    /// without a configured `database_path`.
    pub fn open_in_memory() -> Result<Self, OpenError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Opens an existing database, validating that the schema is present
    /// and at the latest migration version.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let conn = Connection::open(path)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let latest = migrations::ALL.last().map(|(v, _)| *v as i64).unwrap_or(0);
        if version == 0 {
            return Err(OpenError::SchemaInvalid("database has no applied migrations".into()));
        }
        let table_exists: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name='sectors'",
                [],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !table_exists {
            return Err(OpenError::SchemaInvalid("missing sectors table".into()));
        }
        if version < latest {
            let mut store = Self { conn };
            store.apply_migrations()?;
            return Ok(store);
        }
        Ok(Self { conn })
    }

    pub fn close(self) -> Result<(), OpenError> {
        self.conn.close().map_err(|(_, e)| OpenError::Storage(e.to_string()))
    }

    fn apply_migrations(&mut self) -> Result<(), OpenError> {
        let current: i64 = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        for &(version, sql) in migrations::ALL {
            if version as i64 <= current {
                continue;
            }
            self.conn.execute_batch(sql)?;
            self.conn.pragma_update(None, "user_version", version)?;
        }
        Ok(())
    }

    /// Runs `f` inside a single transaction, committing on success and
    /// rolling back on any error (`spec.md` §4.H/§5 — every begin is paired
    /// with exactly one commit or rollback on every exit path).
    pub fn with_txn<F, T>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    {
        let txn = self.conn.transaction().map_err(to_storage_err)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(to_storage_err)?;
                Ok(value)
            }
            Err(e) => {
                let _ = txn.rollback();
                Err(to_storage_err(e))
            }
        }
    }
}

fn row_to_sector(row: &rusqlite::Row<'_>, planets: Vec<Planet>, traders: Vec<Trader>, ships: Vec<Ship>) -> rusqlite::Result<Sector> {
    let idx: u32 = row.get("idx")?;
    let warps = [
        row.get::<_, i64>("warp1")? as u32,
        row.get::<_, i64>("warp2")? as u32,
        row.get::<_, i64>("warp3")? as u32,
        row.get::<_, i64>("warp4")? as u32,
        row.get::<_, i64>("warp5")? as u32,
        row.get::<_, i64>("warp6")? as u32,
    ];
    let port_name: String = row.get("port_name")?;
    let port = if port_name.is_empty() {
        None
    } else {
        Some(Port {
            name: port_name,
            class_index: row.get::<_, i64>("port_class")? as u8,
            buy_product: [row.get("port_buy0")?, row.get("port_buy1")?, row.get("port_buy2")?],
            product_amount: [row.get("port_amount0")?, row.get("port_amount1")?, row.get("port_amount2")?],
            product_percent: [row.get("port_percent0")?, row.get("port_percent1")?, row.get("port_percent2")?],
            build_time: row.get("port_build_time")?,
            dead: row.get::<_, i64>("port_dead")? != 0,
        })
    };
    let fighters = row
        .get::<_, Option<i64>>("fighters_qty")?
        .map(|qty| -> rusqlite::Result<Fighters> {
            Ok(Fighters {
                qty,
                owner: row.get("fighters_owner")?,
                kind: fighter_kind_from_i64(row.get("fighters_kind")?),
            })
        })
        .transpose()?;
    let mines_armid = row
        .get::<_, Option<i64>>("mines_armid_qty")?
        .map(|qty| -> rusqlite::Result<MinesArmid> {
            Ok(MinesArmid { qty, owner: row.get("mines_armid_owner")? })
        })
        .transpose()?;
    let mines_limpet = row
        .get::<_, Option<i64>>("mines_limpet_qty")?
        .map(|qty| -> rusqlite::Result<MinesLimpet> {
            Ok(MinesLimpet { qty, owner: row.get("mines_limpet_owner")? })
        })
        .transpose()?;

    Ok(Sector {
        index: idx,
        warps,
        warps_count: row.get::<_, i64>("warps_count")? as u32,
        constellation: row.get("constellation")?,
        beacon: row.get("beacon")?,
        nav_haz: row.get("nav_haz")?,
        density: row.get("density")?,
        anomaly: row.get::<_, i64>("anomaly")? != 0,
        explored: explored_from_i64(row.get("explored")?),
        port,
        traders,
        ships,
        planets,
        fighters,
        mines_armid,
        mines_limpet,
    })
}

impl SectorStore for Store {
    fn load_sector(&mut self, index: u32) -> Result<Option<Sector>, StoreError> {
        let conn = &self.conn;
        let planets = load_planets(conn, index).map_err(to_storage_err)?;
        let traders = load_traders(conn, index).map_err(to_storage_err)?;
        let ships = load_ships(conn, index).map_err(to_storage_err)?;
        conn.query_row("SELECT * FROM sectors WHERE idx = ?1", params![index], |row| {
            row_to_sector(row, planets, traders, ships)
        })
        .optional()
        .map_err(to_storage_err)
    }

    fn save_sector(&mut self, sector: &Sector) -> Result<(), StoreError> {
        let updated_at = now_rfc3339();
        self.with_txn(|txn| {
            let (port_name, class, buy, amount, percent, build_time, dead) = match &sector.port {
                Some(p) => (
                    p.name.clone(),
                    p.class_index as i64,
                    p.buy_product,
                    p.product_amount,
                    p.product_percent,
                    p.build_time,
                    p.dead as i64,
                ),
                None => (String::new(), 0, [false; 3], [0; 3], [0; 3], 0, 0),
            };
            let (fqty, fowner, fkind): (Option<i64>, Option<String>, Option<i64>) = match &sector.fighters {
                Some(f) => (Some(f.qty), Some(f.owner.clone()), Some(fighter_kind_to_i64(f.kind))),
                None => (None, None, None),
            };
            let (aqty, aowner): (Option<i64>, Option<String>) = match &sector.mines_armid {
                Some(m) => (Some(m.qty), Some(m.owner.clone())),
                None => (None, None),
            };
            let (lqty, lowner): (Option<i64>, Option<String>) = match &sector.mines_limpet {
                Some(m) => (Some(m.qty), Some(m.owner.clone())),
                None => (None, None),
            };

            txn.execute(
                "INSERT INTO sectors (idx, warp1, warp2, warp3, warp4, warp5, warp6, warps_count,
                    constellation, beacon, nav_haz, density, anomaly, explored,
                    port_name, port_class, port_buy0, port_buy1, port_buy2,
                    port_amount0, port_amount1, port_amount2,
                    port_percent0, port_percent1, port_percent2, port_build_time, port_dead,
                    fighters_qty, fighters_owner, fighters_kind,
                    mines_armid_qty, mines_armid_owner, mines_limpet_qty, mines_limpet_owner,
                    updated_at)
                 VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)
                 ON CONFLICT(idx) DO UPDATE SET
                    warp1=excluded.warp1, warp2=excluded.warp2, warp3=excluded.warp3, warp4=excluded.warp4,
                    warp5=excluded.warp5, warp6=excluded.warp6, warps_count=excluded.warps_count,
                    constellation=excluded.constellation, beacon=excluded.beacon, nav_haz=excluded.nav_haz,
                    density=excluded.density, anomaly=excluded.anomaly, explored=excluded.explored,
                    port_name=excluded.port_name, port_class=excluded.port_class,
                    port_buy0=excluded.port_buy0, port_buy1=excluded.port_buy1, port_buy2=excluded.port_buy2,
                    port_amount0=excluded.port_amount0, port_amount1=excluded.port_amount1, port_amount2=excluded.port_amount2,
                    port_percent0=excluded.port_percent0, port_percent1=excluded.port_percent1, port_percent2=excluded.port_percent2,
                    port_build_time=excluded.port_build_time, port_dead=excluded.port_dead,
                    fighters_qty=excluded.fighters_qty, fighters_owner=excluded.fighters_owner, fighters_kind=excluded.fighters_kind,
                    mines_armid_qty=excluded.mines_armid_qty, mines_armid_owner=excluded.mines_armid_owner,
                    mines_limpet_qty=excluded.mines_limpet_qty, mines_limpet_owner=excluded.mines_limpet_owner,
                    updated_at=excluded.updated_at",
                params![
                    sector.index,
                    sector.warps[0], sector.warps[1], sector.warps[2], sector.warps[3], sector.warps[4], sector.warps[5],
                    sector.warps_count, sector.constellation, sector.beacon, sector.nav_haz, sector.density,
                    sector.anomaly as i64, explored_to_i64(sector.explored),
                    port_name, class, buy[0], buy[1], buy[2], amount[0], amount[1], amount[2],
                    percent[0], percent[1], percent[2], build_time, dead,
                    fqty, fowner, fkind, aqty, aowner, lqty, lowner,
                    updated_at,
                ],
            )?;

            txn.execute("DELETE FROM planets WHERE sector_index = ?1", params![sector.index])?;
            for (slot, planet) in sector.planets.iter().enumerate() {
                txn.execute(
                    "INSERT INTO planets (sector_index, slot, name) VALUES (?1, ?2, ?3)",
                    params![sector.index, slot as i64, planet.name],
                )?;
            }

            txn.execute("DELETE FROM traders WHERE sector_index = ?1", params![sector.index])?;
            for (slot, trader) in sector.traders.iter().enumerate() {
                txn.execute(
                    "INSERT INTO traders (sector_index, slot, name, figs, ship_name, ship_type) VALUES (?1,?2,?3,?4,?5,?6)",
                    params![sector.index, slot as i64, trader.name, trader.figs, trader.ship_name, trader.ship_type],
                )?;
            }

            txn.execute("DELETE FROM ships WHERE sector_index = ?1", params![sector.index])?;
            for (slot, ship) in sector.ships.iter().enumerate() {
                txn.execute(
                    "INSERT INTO ships (sector_index, slot, name, owner, figs, ship_type) VALUES (?1,?2,?3,?4,?5,?6)",
                    params![sector.index, slot as i64, ship.name, ship.owner, ship.figs, ship.ship_type],
                )?;
            }
            Ok(())
        })
    }

    fn load_port(&mut self, sector: u32) -> Result<Option<Port>, StoreError> {
        self.conn
            .query_row("SELECT * FROM ports WHERE sector_index = ?1", params![sector], |row| {
                Ok(Port {
                    name: row.get("name")?,
                    class_index: row.get::<_, i64>("class_index")? as u8,
                    buy_product: [row.get("buy0")?, row.get("buy1")?, row.get("buy2")?],
                    product_amount: [row.get("amount0")?, row.get("amount1")?, row.get("amount2")?],
                    product_percent: [row.get("percent0")?, row.get("percent1")?, row.get("percent2")?],
                    build_time: row.get("build_time")?,
                    dead: row.get::<_, i64>("dead")? != 0,
                })
            })
            .optional()
            .map_err(to_storage_err)
    }

    fn save_port(&mut self, sector: u32, port: &Port) -> Result<(), StoreError> {
        let updated_at = now_rfc3339();
        self.with_txn(|txn| {
            txn.execute(
                "INSERT INTO ports (sector_index, name, class_index, buy0, buy1, buy2,
                    amount0, amount1, amount2, percent0, percent1, percent2, build_time, dead, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
                 ON CONFLICT(sector_index) DO UPDATE SET
                    name=excluded.name, class_index=excluded.class_index,
                    buy0=excluded.buy0, buy1=excluded.buy1, buy2=excluded.buy2,
                    amount0=excluded.amount0, amount1=excluded.amount1, amount2=excluded.amount2,
                    percent0=excluded.percent0, percent1=excluded.percent1, percent2=excluded.percent2,
                    build_time=excluded.build_time, dead=excluded.dead, updated_at=excluded.updated_at",
                params![
                    sector,
                    port.name,
                    port.class_index as i64,
                    port.buy_product[0], port.buy_product[1], port.buy_product[2],
                    port.product_amount[0], port.product_amount[1], port.product_amount[2],
                    port.product_percent[0], port.product_percent[1], port.product_percent[2],
                    port.build_time, port.dead as i64, updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn clear_port(&mut self, sector: u32) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM ports WHERE sector_index = ?1", params![sector])
            .map_err(to_storage_err)?;
        Ok(())
    }

    fn load_player(&mut self) -> Result<Option<PlayerStats>, StoreError> {
        self.conn
            .query_row("SELECT * FROM player_stats WHERE id = 1", [], |row| {
                Ok(PlayerStats {
                    credits: row.get("credits")?,
                    experience: row.get("experience")?,
                    alignment: row.get("alignment")?,
                    turns: row.get("turns")?,
                    ship_number: row.get("ship_number")?,
                    total_holds: row.get("total_holds")?,
                    ore_holds: row.get("ore_holds")?,
                    org_holds: row.get("org_holds")?,
                    equ_holds: row.get("equ_holds")?,
                    col_holds: row.get("col_holds")?,
                    fighters: row.get("fighters")?,
                    shields: row.get("shields")?,
                    photons: row.get("photons")?,
                    armid_mines: row.get("armid_mines")?,
                    limpet_mines: row.get("limpet_mines")?,
                    genesis_torps: row.get("genesis_torps")?,
                    cloaks: row.get("cloaks")?,
                    beacons: row.get("beacons")?,
                    atomics: row.get("atomics")?,
                    corbomite: row.get("corbomite")?,
                    eprobes: row.get("eprobes")?,
                    mine_disruptors: row.get("mine_disruptors")?,
                    current_sector: row.get::<_, i64>("current_sector")? as u32,
                })
            })
            .optional()
            .map_err(to_storage_err)
    }

    fn save_player(&mut self, player: &PlayerStats) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO player_stats (id, credits, experience, alignment, turns, ship_number,
                    total_holds, ore_holds, org_holds, equ_holds, col_holds, fighters, shields, photons,
                    armid_mines, limpet_mines, genesis_torps, cloaks, beacons, atomics, corbomite,
                    eprobes, mine_disruptors, current_sector)
                 VALUES (1,?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23)
                 ON CONFLICT(id) DO UPDATE SET
                    credits=excluded.credits, experience=excluded.experience, alignment=excluded.alignment,
                    turns=excluded.turns, ship_number=excluded.ship_number, total_holds=excluded.total_holds,
                    ore_holds=excluded.ore_holds, org_holds=excluded.org_holds, equ_holds=excluded.equ_holds,
                    col_holds=excluded.col_holds, fighters=excluded.fighters, shields=excluded.shields,
                    photons=excluded.photons, armid_mines=excluded.armid_mines, limpet_mines=excluded.limpet_mines,
                    genesis_torps=excluded.genesis_torps, cloaks=excluded.cloaks, beacons=excluded.beacons,
                    atomics=excluded.atomics, corbomite=excluded.corbomite, eprobes=excluded.eprobes,
                    mine_disruptors=excluded.mine_disruptors, current_sector=excluded.current_sector",
                params![
                    player.credits, player.experience, player.alignment, player.turns, player.ship_number,
                    player.total_holds, player.ore_holds, player.org_holds, player.equ_holds, player.col_holds,
                    player.fighters, player.shields, player.photons, player.armid_mines, player.limpet_mines,
                    player.genesis_torps, player.cloaks, player.beacons, player.atomics, player.corbomite,
                    player.eprobes, player.mine_disruptors, player.current_sector,
                ],
            )
            .map_err(to_storage_err)?;
        Ok(())
    }

    fn load_script_var(&mut self, name: &str) -> Result<Option<ScriptValue>, StoreError> {
        self.conn
            .query_row(
                "SELECT type_tag, string_value, number_value, array_json FROM script_vars WHERE name = ?1",
                params![name],
                |row| {
                    let tag: String = row.get(0)?;
                    let value = match tag.as_str() {
                        "string" => ScriptValue::String(row.get::<_, String>(1)?),
                        "number" => ScriptValue::Number(row.get(2)?),
                        _ => {
                            let json: String = row.get::<_, Option<String>>(3)?.unwrap_or_default();
                            script_value_from_json(&json)
                        }
                    };
                    Ok(value)
                },
            )
            .optional()
            .map_err(to_storage_err)
    }

    fn save_script_var(&mut self, name: &str, value: &ScriptValue) -> Result<(), StoreError> {
        let updated_at = now_rfc3339();
        let (tag, string_value, number_value, array_json) = match value {
            ScriptValue::String(s) => ("string", Some(s.clone()), None, None),
            ScriptValue::Number(n) => ("number", None, Some(*n), None),
            ScriptValue::Array(_) => ("array", None, None, Some(script_value_to_json(value))),
        };
        self.conn
            .execute(
                "INSERT INTO script_vars (name, type_tag, string_value, number_value, array_json, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6)
                 ON CONFLICT(name) DO UPDATE SET
                    type_tag=excluded.type_tag, string_value=excluded.string_value,
                    number_value=excluded.number_value, array_json=excluded.array_json, updated_at=excluded.updated_at",
                params![name, tag, string_value, number_value, array_json, updated_at],
            )
            .map_err(to_storage_err)?;
        Ok(())
    }
}

fn load_planets(conn: &Connection, sector: u32) -> rusqlite::Result<Vec<Planet>> {
    let mut stmt = conn.prepare("SELECT name FROM planets WHERE sector_index = ?1 ORDER BY slot")?;
    let rows = stmt.query_map(params![sector], |row| Ok(Planet { name: row.get(0)? }))?;
    rows.collect()
}

fn load_traders(conn: &Connection, sector: u32) -> rusqlite::Result<Vec<Trader>> {
    let mut stmt = conn.prepare("SELECT name, figs, ship_name, ship_type FROM traders WHERE sector_index = ?1 ORDER BY slot")?;
    let rows = stmt.query_map(params![sector], |row| {
        Ok(Trader {
            name: row.get(0)?,
            figs: row.get(1)?,
            ship_name: row.get(2)?,
            ship_type: row.get(3)?,
        })
    })?;
    rows.collect()
}

fn load_ships(conn: &Connection, sector: u32) -> rusqlite::Result<Vec<Ship>> {
    let mut stmt = conn.prepare("SELECT name, owner, figs, ship_type FROM ships WHERE sector_index = ?1 ORDER BY slot")?;
    let rows = stmt.query_map(params![sector], |row| {
        Ok(Ship {
            name: row.get(0)?,
            owner: row.get(1)?,
            figs: row.get(2)?,
            ship_type: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Script variables are the one place the data model nests arbitrarily;
/// hand-rolled JSON conversion avoids pulling `serde`'s derive machinery
/// into `core-model` just for this.
fn script_value_to_json(value: &ScriptValue) -> String {
    fn to_value(v: &ScriptValue) -> serde_json::Value {
        match v {
            ScriptValue::String(s) => serde_json::Value::String(s.clone()),
            ScriptValue::Number(n) => serde_json::json!(n),
            ScriptValue::Array(items) => serde_json::Value::Array(items.iter().map(to_value).collect()),
        }
    }
    to_value(value).to_string()
}

fn script_value_from_json(json: &str) -> ScriptValue {
    fn from_value(v: &serde_json::Value) -> ScriptValue {
        match v {
            serde_json::Value::String(s) => ScriptValue::String(s.clone()),
            serde_json::Value::Number(n) => ScriptValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::Array(items) => ScriptValue::Array(items.iter().map(from_value).collect()),
            _ => ScriptValue::Array(Vec::new()),
        }
    }
    serde_json::from_str(json)
        .map(|v: serde_json::Value| from_value(&v))
        .unwrap_or(ScriptValue::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_store() -> Store {
        let file = NamedTempFile::new().unwrap();
        Store::create(file.path()).unwrap()
    }

    #[test]
    fn save_and_load_sector_round_trips() {
        let mut store = temp_store();
        let mut sector = Sector::null(286);
        sector.constellation = "Federation Space".into();
        sector.warps = [39, 844, 0, 0, 0, 0];
        sector.warps_count = 2;
        sector.explored = Explored::Holo;
        sector.planets.push(Planet { name: "Hope".into() });
        store.save_sector(&sector).unwrap();

        let loaded = store.load_sector(286).unwrap().unwrap();
        assert_eq!(loaded.constellation, "Federation Space");
        assert_eq!(loaded.warps, [39, 844, 0, 0, 0, 0]);
        assert_eq!(loaded.explored, Explored::Holo);
        assert_eq!(loaded.planets.len(), 1);
    }

    #[test]
    fn load_missing_sector_returns_none_not_error() {
        let mut store = temp_store();
        assert_eq!(store.load_sector(9999).unwrap(), None);
    }

    #[test]
    fn save_sector_replaces_child_collections() {
        let mut store = temp_store();
        let mut sector = Sector::null(1);
        sector.traders.push(Trader {
            name: "A".into(),
            figs: 1,
            ship_name: "S".into(),
            ship_type: "T".into(),
        });
        store.save_sector(&sector).unwrap();

        let mut sector2 = Sector::null(1);
        sector2.traders.push(Trader {
            name: "B".into(),
            figs: 2,
            ship_name: "S2".into(),
            ship_type: "T2".into(),
        });
        store.save_sector(&sector2).unwrap();

        let loaded = store.load_sector(1).unwrap().unwrap();
        assert_eq!(loaded.traders.len(), 1);
        assert_eq!(loaded.traders[0].name, "B");
    }

    #[test]
    fn port_save_load_clear_round_trip() {
        let mut store = temp_store();
        let mut port = Port::empty();
        port.name = "Grav".into();
        port.class_index = 7;
        store.save_port(286, &port).unwrap();
        assert_eq!(store.load_port(286).unwrap().unwrap().name, "Grav");
        store.clear_port(286).unwrap();
        assert_eq!(store.load_port(286).unwrap(), None);
    }

    #[test]
    fn player_stats_round_trip() {
        let mut store = temp_store();
        let mut stats = PlayerStats::default();
        stats.credits = 374_999;
        stats.current_sector = 2142;
        store.save_player(&stats).unwrap();
        let loaded = store.load_player().unwrap().unwrap();
        assert_eq!(loaded.credits, 374_999);
        assert_eq!(loaded.current_sector, 2142);
    }

    #[test]
    fn script_var_round_trips_each_variant() {
        let mut store = temp_store();
        store.save_script_var("greeting", &ScriptValue::String("hi".into())).unwrap();
        store.save_script_var("count", &ScriptValue::Number(42.0)).unwrap();
        store
            .save_script_var(
                "list",
                &ScriptValue::Array(vec![ScriptValue::Number(1.0), ScriptValue::String("x".into())]),
            )
            .unwrap();

        assert_eq!(store.load_script_var("greeting").unwrap(), Some(ScriptValue::String("hi".into())));
        assert_eq!(store.load_script_var("count").unwrap(), Some(ScriptValue::Number(42.0)));
        assert_eq!(
            store.load_script_var("list").unwrap(),
            Some(ScriptValue::Array(vec![ScriptValue::Number(1.0), ScriptValue::String("x".into())]))
        );
    }

    #[test]
    fn open_rejects_database_with_no_schema() {
        let file = NamedTempFile::new().unwrap();
        Connection::open(file.path()).unwrap();
        let result = Store::open(file.path());
        assert!(matches!(result, Err(OpenError::SchemaInvalid(_))));
    }

    #[test]
    fn open_succeeds_after_create() {
        let file = NamedTempFile::new().unwrap();
        Store::create(file.path()).unwrap().close().unwrap();
        Store::open(file.path()).unwrap();
    }
}
