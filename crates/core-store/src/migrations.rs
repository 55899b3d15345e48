//! Forward-only schema migrations, applied in order and tracked via
//! `PRAGMA user_version` (`spec.md` §4.H).

/// `(version, sql)` pairs. Every entry's SQL is applied exactly once, in
/// order, the first time a database reaches that version; never edit an
/// already-shipped entry — append a new one instead.
pub const ALL: &[(i32, &str)] = &[(
    1,
    r#"
    CREATE TABLE sectors (
        idx             INTEGER PRIMARY KEY,
        warp1           INTEGER NOT NULL DEFAULT 0,
        warp2           INTEGER NOT NULL DEFAULT 0,
        warp3           INTEGER NOT NULL DEFAULT 0,
        warp4           INTEGER NOT NULL DEFAULT 0,
        warp5           INTEGER NOT NULL DEFAULT 0,
        warp6           INTEGER NOT NULL DEFAULT 0,
        warps_count     INTEGER NOT NULL DEFAULT 0,
        constellation   TEXT NOT NULL DEFAULT '',
        beacon          TEXT NOT NULL DEFAULT '',
        nav_haz         INTEGER NOT NULL DEFAULT 0,
        density         INTEGER NOT NULL DEFAULT -1,
        anomaly         INTEGER NOT NULL DEFAULT 0,
        explored        INTEGER NOT NULL DEFAULT 0,
        port_name       TEXT NOT NULL DEFAULT '',
        port_class      INTEGER NOT NULL DEFAULT 0,
        port_buy0       INTEGER NOT NULL DEFAULT 0,
        port_buy1       INTEGER NOT NULL DEFAULT 0,
        port_buy2       INTEGER NOT NULL DEFAULT 0,
        port_amount0    INTEGER NOT NULL DEFAULT 0,
        port_amount1    INTEGER NOT NULL DEFAULT 0,
        port_amount2    INTEGER NOT NULL DEFAULT 0,
        port_percent0   INTEGER NOT NULL DEFAULT 0,
        port_percent1   INTEGER NOT NULL DEFAULT 0,
        port_percent2   INTEGER NOT NULL DEFAULT 0,
        port_build_time INTEGER NOT NULL DEFAULT 0,
        port_dead       INTEGER NOT NULL DEFAULT 0,
        fighters_qty    INTEGER,
        fighters_owner  TEXT,
        fighters_kind   INTEGER,
        mines_armid_qty    INTEGER,
        mines_armid_owner  TEXT,
        mines_limpet_qty   INTEGER,
        mines_limpet_owner TEXT,
        updated_at      TEXT NOT NULL
    );

    CREATE TABLE planets (
        sector_index INTEGER NOT NULL,
        slot         INTEGER NOT NULL,
        name         TEXT NOT NULL,
        PRIMARY KEY (sector_index, slot)
    );

    CREATE TABLE traders (
        sector_index INTEGER NOT NULL,
        slot         INTEGER NOT NULL,
        name         TEXT NOT NULL,
        figs         INTEGER NOT NULL,
        ship_name    TEXT NOT NULL,
        ship_type    TEXT NOT NULL,
        PRIMARY KEY (sector_index, slot)
    );

    CREATE TABLE ships (
        sector_index INTEGER NOT NULL,
        slot         INTEGER NOT NULL,
        name         TEXT NOT NULL,
        owner        TEXT NOT NULL,
        figs         INTEGER NOT NULL,
        ship_type    TEXT NOT NULL,
        PRIMARY KEY (sector_index, slot)
    );

    CREATE TABLE ports (
        sector_index    INTEGER PRIMARY KEY,
        name            TEXT NOT NULL,
        class_index     INTEGER NOT NULL,
        buy0            INTEGER NOT NULL,
        buy1            INTEGER NOT NULL,
        buy2            INTEGER NOT NULL,
        amount0         INTEGER NOT NULL,
        amount1         INTEGER NOT NULL,
        amount2         INTEGER NOT NULL,
        percent0        INTEGER NOT NULL,
        percent1        INTEGER NOT NULL,
        percent2        INTEGER NOT NULL,
        build_time      INTEGER NOT NULL,
        dead            INTEGER NOT NULL,
        updated_at      TEXT NOT NULL
    );

    CREATE TABLE player_stats (
        id              INTEGER PRIMARY KEY CHECK (id = 1),
        credits         INTEGER NOT NULL,
        experience      INTEGER NOT NULL,
        alignment       INTEGER NOT NULL,
        turns           INTEGER NOT NULL,
        ship_number     INTEGER NOT NULL,
        total_holds     INTEGER NOT NULL,
        ore_holds       INTEGER NOT NULL,
        org_holds       INTEGER NOT NULL,
        equ_holds       INTEGER NOT NULL,
        col_holds       INTEGER NOT NULL,
        fighters        INTEGER NOT NULL,
        shields         INTEGER NOT NULL,
        photons         INTEGER NOT NULL,
        armid_mines     INTEGER NOT NULL,
        limpet_mines    INTEGER NOT NULL,
        genesis_torps   INTEGER NOT NULL,
        cloaks          INTEGER NOT NULL,
        beacons         INTEGER NOT NULL,
        atomics         INTEGER NOT NULL,
        corbomite       INTEGER NOT NULL,
        eprobes         INTEGER NOT NULL,
        mine_disruptors INTEGER NOT NULL,
        current_sector  INTEGER NOT NULL
    );

    CREATE TABLE script_vars (
        name            TEXT PRIMARY KEY,
        type_tag        TEXT NOT NULL,
        string_value    TEXT,
        number_value    REAL,
        array_json      TEXT,
        updated_at      TEXT NOT NULL
    );
    "#,
)];
