//! Data model (`spec.md` §3): sectors, ports, their child records, and the
//! typed script-variable value.

/// Exploration status, totally ordered `None < Calc < Density < Holo`
/// (`spec.md` invariant 1 — status is monotonically non-decreasing per
/// sector). Variant declaration order *is* the ordering: do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Explored {
    #[default]
    None,
    Calc,
    Density,
    Holo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FighterKind {
    Toll,
    Defensive,
    Offensive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fighters {
    pub qty: i64,
    pub owner: String,
    pub kind: FighterKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinesArmid {
    pub qty: i64,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinesLimpet {
    pub qty: i64,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trader {
    pub name: String,
    pub figs: i64,
    pub ship_name: String,
    pub ship_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub name: String,
    pub owner: String,
    pub figs: i64,
    pub ship_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub name: String,
}

/// A port: at most one per sector (`spec.md` §3). `Port::empty` is the
/// "no port recorded" sentinel — never confuse it with `None` at the
/// `Sector::port` field, which distinguishes "not yet observed" from
/// "known absent" (the latter is `clear_port`'s job, per invariant 2).
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub name: String,
    pub class_index: u8,
    pub buy_product: [bool; 3],
    pub product_amount: [i64; 3],
    pub product_percent: [i32; 3],
    pub build_time: i32,
    pub dead: bool,
}

impl Default for Port {
    fn default() -> Self {
        Self::empty()
    }
}

impl Port {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            class_index: 0,
            buy_product: [false; 3],
            product_amount: [0; 3],
            product_percent: [0; 3],
            build_time: 0,
            dead: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Product index as used throughout the port parser and the schema.
pub const PRODUCT_FUEL_ORE: usize = 0;
pub const PRODUCT_ORGANICS: usize = 1;
pub const PRODUCT_EQUIPMENT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub index: u32,
    /// Up to six neighbor indices, 0 = absent slot. Slot order matches the
    /// server's left-to-right warp list (invariant 4); `(N)` undiscovered
    /// warps are kept as the plain integer N, never elided.
    pub warps: [u32; 6],
    pub warps_count: u32,
    pub constellation: String,
    pub beacon: String,
    pub nav_haz: i32,
    pub density: i64,
    pub anomaly: bool,
    pub explored: Explored,
    pub port: Option<Port>,
    pub traders: Vec<Trader>,
    pub ships: Vec<Ship>,
    pub planets: Vec<Planet>,
    pub fighters: Option<Fighters>,
    pub mines_armid: Option<MinesArmid>,
    pub mines_limpet: Option<MinesLimpet>,
}

impl Sector {
    pub fn null(index: u32) -> Self {
        Self {
            index,
            warps: [0; 6],
            warps_count: 0,
            constellation: String::new(),
            beacon: String::new(),
            nav_haz: 0,
            density: -1,
            anomaly: false,
            explored: Explored::None,
            port: None,
            traders: Vec::new(),
            ships: Vec::new(),
            planets: Vec::new(),
            fighters: None,
            mines_armid: None,
            mines_limpet: None,
        }
    }
}

/// A script variable's dynamically typed value. `Array` nests arbitrarily,
/// matching the scripting runtime's own dynamic typing (`SPEC_FULL.md` §3).
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    String(String),
    Number(f64),
    Array(Vec<ScriptValue>),
}
