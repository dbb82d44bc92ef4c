//! Device identification table and protocol resolution
//!
//! Serial-probed devices are matched against a static, ordered table; the
//! first matching entry decides the protocol family and default dimensions.
//! Network addresses skip probing entirely and resolve to the OSC family,
//! whose codec is provided by an external crate.

/// Protocol family used when a probed serial matches no table entry.
pub const DEFAULT_FAMILY: &str = "40h";

/// Protocol family selected unconditionally for network addresses.
pub const OSC_FAMILY: &str = "osc";

/// One row of the device identification table.
#[derive(Debug, Clone, Copy)]
pub struct DeviceMapEntry {
    /// Serial pattern: a literal prefix followed by `%d`, which matches one
    /// or more decimal digits.
    pub serial_pattern: &'static str,
    /// Protocol family identifier, the key into the codec registry.
    pub family: &'static str,
    /// Default row count for this model.
    pub rows: u8,
    /// Default column count for this model.
    pub cols: u8,
    /// Human-readable model name.
    pub name: &'static str,
}

/// Known grid models, in match priority order. First pattern match wins.
pub const DEVICE_MAP: &[DeviceMapEntry] = &[
    DeviceMapEntry {
        serial_pattern: "m256-%d",
        family: "series",
        rows: 16,
        cols: 16,
        name: "monome 256",
    },
    DeviceMapEntry {
        serial_pattern: "m128-%d",
        family: "series",
        rows: 16,
        cols: 8,
        name: "monome 128",
    },
    DeviceMapEntry {
        serial_pattern: "m64-%d",
        family: "series",
        rows: 8,
        cols: 8,
        name: "monome 64",
    },
    DeviceMapEntry {
        serial_pattern: "m40h%d",
        family: "40h",
        rows: 8,
        cols: 8,
        name: "monome 40h",
    },
    DeviceMapEntry {
        serial_pattern: "a40h-%d",
        family: "40h",
        rows: 8,
        cols: 8,
        name: "arduinome",
    },
];

/// Find the table entry for a probed serial string, if any.
///
/// Matching is deterministic: entries are tried in declaration order and the
/// first hit wins, even if a later entry would also match.
pub fn lookup_serial(serial: &str) -> Option<&'static DeviceMapEntry> {
    DEVICE_MAP
        .iter()
        .find(|entry| serial_matches(entry.serial_pattern, serial))
}

/// Match a serial against a `prefix%d` pattern.
///
/// The numeric tail only needs to start with a digit; trailing garbage is
/// tolerated, the way a `%d` scan conversion would tolerate it.
fn serial_matches(pattern: &str, serial: &str) -> bool {
    match pattern.split_once("%d") {
        Some((prefix, "")) => serial
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit()),
        _ => pattern == serial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_serials_resolve_to_their_model() {
        let m = lookup_serial("m40h0123").expect("40h serial should match");
        assert_eq!(m.family, "40h");
        assert_eq!((m.rows, m.cols), (8, 8));
        assert_eq!(m.name, "monome 40h");

        let m = lookup_serial("m128-17").expect("128 serial should match");
        assert_eq!(m.family, "series");
        assert_eq!((m.rows, m.cols), (16, 8));
    }

    #[test]
    fn arduinome_serials_use_the_40h_family() {
        let m = lookup_serial("a40h-002").expect("arduinome serial should match");
        assert_eq!(m.family, "40h");
        assert_eq!(m.name, "arduinome");
    }

    #[test]
    fn first_match_wins_in_declaration_order() {
        // "m256-1" also has "m2" as a prefix of nothing earlier; assert the
        // 256 entry is chosen rather than any later one.
        let m = lookup_serial("m256-1").unwrap();
        assert_eq!(m.name, "monome 256");
    }

    #[test]
    fn unknown_serials_do_not_match() {
        assert!(lookup_serial("widget-99").is_none());
        // Pattern requires at least one digit after the prefix.
        assert!(lookup_serial("m40h").is_none());
        assert!(lookup_serial("m40hx").is_none());
    }
}
