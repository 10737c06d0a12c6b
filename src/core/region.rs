// LogVista - core/region.rs
//
// Region classification: maps a source file's name to the operational
// site it originates from via ordered keyword matching.
// Core layer: pure logic, no I/O or UI dependencies.

use serde::{Deserialize, Serialize};

/// Operational site a log file originates from, derived from its filename.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Region {
    Nashik,
    Bhubaneswar,
    Bhopal,
    Mumbai,
    Bangalore,
    Delhi,
    Hyderabad,
    Chennai,
    Kolkata,
    #[default]
    Unknown,
}

/// Ordered keyword table used by `classify`.
///
/// Order is a semantic invariant: the FIRST keyword found as a substring
/// of the filename wins, not the longest or most specific match.
/// Reordering entries changes classification results.
pub const REGION_KEYWORDS: &[(&str, Region)] = &[
    ("NSK", Region::Nashik),
    ("BBSR", Region::Bhubaneswar),
    ("BHO", Region::Bhopal),
    ("MUM", Region::Mumbai),
    ("BGLR", Region::Bangalore),
    ("DEL", Region::Delhi),
    ("HYD", Region::Hyderabad),
    ("CHN", Region::Chennai),
    ("KOL", Region::Kolkata),
];

impl Region {
    /// Returns all variants in display order (`Unknown` last).
    pub fn all() -> &'static [Region] {
        &[
            Region::Nashik,
            Region::Bhubaneswar,
            Region::Bhopal,
            Region::Mumbai,
            Region::Bangalore,
            Region::Delhi,
            Region::Hyderabad,
            Region::Chennai,
            Region::Kolkata,
            Region::Unknown,
        ]
    }

    /// Human-readable label for display and export.
    pub fn label(&self) -> &'static str {
        match self {
            Region::Nashik => "Nashik",
            Region::Bhubaneswar => "Bhubaneswar",
            Region::Bhopal => "Bhopal",
            Region::Mumbai => "Mumbai",
            Region::Bangalore => "Bangalore",
            Region::Delhi => "Delhi",
            Region::Hyderabad => "Hyderabad",
            Region::Chennai => "Chennai",
            Region::Kolkata => "Kolkata",
            Region::Unknown => "Unknown",
        }
    }

    /// Parse a display label back into a Region (used when re-ingesting
    /// exported data).  Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Region {
        Region::all()
            .iter()
            .copied()
            .find(|r| r.label() == label)
            .unwrap_or(Region::Unknown)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a file name (not a full path) into a Region.
///
/// Keywords are compared case-insensitively as substrings of the
/// filename; the first table entry that matches wins.  Every input
/// yields a label; no match returns `Region::Unknown`.
pub fn classify(filename: &str) -> Region {
    let lower = filename.to_lowercase();
    for (keyword, region) in REGION_KEYWORDS {
        if lower.contains(&keyword.to_lowercase()) {
            return *region;
        }
    }
    Region::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic() {
        assert_eq!(classify("NSK_errors.xlsx"), Region::Nashik);
        assert_eq!(classify("MUM_log.csv"), Region::Mumbai);
        assert_eq!(classify("report_KOL_june.xlsx"), Region::Kolkata);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("nsk_errors.xlsx"), Region::Nashik);
        assert_eq!(classify("Mum_Log.CSV"), Region::Mumbai);
        assert_eq!(classify("hyd2024.xlsx"), Region::Hyderabad);
    }

    #[test]
    fn test_classify_no_match_is_unknown() {
        assert_eq!(classify("errors.xlsx"), Region::Unknown);
        assert_eq!(classify(""), Region::Unknown);
    }

    /// A filename matching two keywords resolves to whichever keyword
    /// appears EARLIER in the table, regardless of position in the name.
    #[test]
    fn test_classify_first_table_entry_wins() {
        // "DEL" (table position 6) and "NSK" (position 1) both match;
        // NSK is earlier in the table so Nashik wins even though DEL
        // appears first in the filename.
        assert_eq!(classify("DEL_to_NSK_transfer.csv"), Region::Nashik);
        // "BHO" (position 3) beats "HYD" (position 7).
        assert_eq!(classify("HYD_BHO_combined.xlsx"), Region::Bhopal);
    }

    #[test]
    fn test_from_label_round_trip() {
        for region in Region::all() {
            assert_eq!(Region::from_label(region.label()), *region);
        }
        assert_eq!(Region::from_label("Atlantis"), Region::Unknown);
    }
}
