//! Context classifier: which "screen" a line belongs to (`spec.md` §4.B).
//!
//! A small deterministic state machine over `(Mode, line)`. This crate only
//! recognizes screen boundaries (headers, prompts, blank-line terminators)
//! and reports a [`Transition`]; the actual field-level grammar for each
//! screen lives in `core-sector`, `core-port`, `core-player`, and `core-cim`.
//!
//! Two recognizer literals are not given verbatim in the upstream
//! transcripts this parser targets and are therefore documented choices
//! (also recorded in `DESIGN.md`):
//! - the CIM block is framed by a line starting with `"CIM data"`
//!   (case-insensitive);
//! - a probe trace is framed by a line starting with `"Probe entering sector"`.

/// The current top-level screen being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    InSector,
    InPortReport,
    InCommerceTransaction,
    InInfoDisplay,
    InQuickStats,
    InDensityScan,
    InCim,
    InProbeTrace,
}

/// What the classifier decided about the current line.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The previously pending snapshot (if any) must be finalized before
    /// this line is parsed; parsing then continues in `entering`.
    Boundary { entering: Mode },
    /// A command prompt was recognized, echoing the player's current
    /// sector. Always a boundary: finalizes any pending sector/port
    /// snapshot and returns to `Idle`.
    Prompt { sector: u32 },
    /// A blank line, which terminates some screens (port report) but is
    /// inert in others.
    Blank,
    /// The line stays within the current mode; forward it to the matching
    /// parser.
    Continue,
}

const INFO_DISPLAY_LABELS: &[&str] = &[
    "Credits",
    "Turns left",
    "Total Holds",
    "Fighters",
    "Shields",
    "Ether Probes",
    "Rank and Exp",
    "Alignment",
    "Experience",
    "Ship Name",
    "Photon Missiles",
    "Armid Mines",
    "Limpet Mines",
    "Genesis Torps",
    "Cloaking Device",
    "Corbomite",
    "Mine Disruptor",
];

fn is_sector_header(line: &str) -> bool {
    line.starts_with("Sector  : ")
}

fn is_commerce_header(line: &str) -> bool {
    line.starts_with("Commerce report for ")
}

fn is_density_header(line: &str) -> bool {
    line.trim_start().starts_with("Relative Density Scan")
}

fn is_density_row(line: &str) -> bool {
    line.trim_start().starts_with("Sector") && line.contains("==>")
}

fn is_cim_header(line: &str) -> bool {
    line.trim_start().to_ascii_lowercase().starts_with("cim data")
}

fn is_probe_header(line: &str) -> bool {
    line.starts_with("Probe entering sector")
}

fn is_info_display_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    INFO_DISPLAY_LABELS
        .iter()
        .any(|label| trimmed.starts_with(label))
}

fn is_quick_stats_line(line: &str) -> bool {
    line.contains("Sect") && line.contains("Turns") && line.contains("Creds")
}

/// Parses `Command [TL=...]:[N] (?=Help)? :`, returning the echoed sector.
pub fn parse_prompt(line: &str) -> Option<u32> {
    if !line.starts_with("Command [") {
        return None;
    }
    let marker = "]:[";
    let start = line.find(marker)? + marker.len();
    let rest = &line[start..];
    let end = rest.find(']')?;
    rest[..end].parse::<u32>().ok()
}

/// Decide the transition for `line` given the `current` mode. Does not
/// mutate any state; the caller applies the returned [`Transition`].
pub fn classify(current: Mode, line: &str) -> Transition {
    if let Some(sector) = parse_prompt(line) {
        return Transition::Prompt { sector };
    }
    if is_sector_header(line) {
        // Re-entering InSector or InProbeTrace preserves which one: a new
        // header always finalizes the prior snapshot and starts another in
        // the *same* top-level family unless we were elsewhere.
        let entering = if current == Mode::InProbeTrace {
            Mode::InProbeTrace
        } else {
            Mode::InSector
        };
        return Transition::Boundary { entering };
    }
    if is_probe_header(line) {
        return Transition::Boundary {
            entering: Mode::InProbeTrace,
        };
    }
    if is_commerce_header(line) {
        return Transition::Boundary {
            entering: Mode::InPortReport,
        };
    }
    if is_density_header(line) || is_density_row(line) {
        return Transition::Boundary {
            entering: Mode::InDensityScan,
        };
    }
    if is_cim_header(line) {
        return Transition::Boundary { entering: Mode::InCim };
    }
    if current != Mode::InInfoDisplay && current != Mode::InQuickStats && is_quick_stats_line(line) {
        return Transition::Boundary {
            entering: Mode::InQuickStats,
        };
    }
    if current != Mode::InInfoDisplay && is_info_display_line(line) {
        return Transition::Boundary {
            entering: Mode::InInfoDisplay,
        };
    }
    if line.trim().is_empty() {
        return Transition::Blank;
    }
    Transition::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sector_header() {
        assert_eq!(
            classify(Mode::Idle, "Sector  : 286 in Federation Space."),
            Transition::Boundary { entering: Mode::InSector }
        );
    }

    #[test]
    fn reentering_sector_header_preserves_probe_mode() {
        assert_eq!(
            classify(Mode::InProbeTrace, "Sector  : 510 in The Fringe."),
            Transition::Boundary { entering: Mode::InProbeTrace }
        );
        assert_eq!(
            classify(Mode::InSector, "Sector  : 510 in The Fringe."),
            Transition::Boundary { entering: Mode::InSector }
        );
    }

    #[test]
    fn recognizes_prompt_and_extracts_sector() {
        let line = "Command [TL=00:00:00]:[2142] (?=Help)? :";
        assert_eq!(classify(Mode::InSector, line), Transition::Prompt { sector: 2142 });
        assert_eq!(parse_prompt(line), Some(2142));
    }

    #[test]
    fn recognizes_commerce_header() {
        assert_eq!(
            classify(Mode::Idle, "Commerce report for Grav (sector 286) : Mon Jan 05, 2026"),
            Transition::Boundary { entering: Mode::InPortReport }
        );
    }

    #[test]
    fn recognizes_density_header_and_rows() {
        assert_eq!(
            classify(Mode::Idle, "                          Relative Density Scan"),
            Transition::Boundary { entering: Mode::InDensityScan }
        );
        assert_eq!(
            classify(Mode::Idle, "Sector  3212  ==>  2000  Warps : 4  NavHaz :  0%  Anom : No"),
            Transition::Boundary { entering: Mode::InDensityScan }
        );
    }

    #[test]
    fn recognizes_cim_header() {
        assert_eq!(
            classify(Mode::Idle, "CIM data follows"),
            Transition::Boundary { entering: Mode::InCim }
        );
    }

    #[test]
    fn recognizes_probe_header() {
        assert_eq!(
            classify(Mode::Idle, "Probe entering sector 274"),
            Transition::Boundary { entering: Mode::InProbeTrace }
        );
    }

    #[test]
    fn recognizes_quick_stats_and_info_display() {
        assert_eq!(
            classify(Mode::Idle, "Sect 2142  Turns 19994  Creds 374999  Figs 0  Shlds 0"),
            Transition::Boundary { entering: Mode::InQuickStats }
        );
        assert_eq!(
            classify(Mode::Idle, "Credits         : 374999"),
            Transition::Boundary { entering: Mode::InInfoDisplay }
        );
    }

    #[test]
    fn blank_line_is_reported_distinctly() {
        assert_eq!(classify(Mode::InPortReport, ""), Transition::Blank);
        assert_eq!(classify(Mode::InPortReport, "   "), Transition::Blank);
    }

    #[test]
    fn unrecognized_line_continues_current_mode() {
        assert_eq!(
            classify(Mode::InSector, "Beacon  : none"),
            Transition::Continue
        );
    }
}
