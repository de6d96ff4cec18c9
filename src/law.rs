//! Traffic violation and road signage reference catalog
//!
//! Penalties follow the Motor Vehicles (Amendment) Act, 2019 schedule; sign
//! groups follow IRC:67-2022. Read-only reference data for report screens.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub code: &'static str,
    pub name: &'static str,
    pub section: &'static str,
    pub penalty: &'static str,
    pub notes: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SignGroup {
    pub name: &'static str,
    pub signs: &'static [&'static str],
}

const MVA: &str = "Motor Vehicles Act, 1988";

pub const VIOLATIONS: &[Violation] = &[
    Violation {
        code: "SPD_183_LMV",
        name: "Speeding (LMV)",
        section: "Section 183",
        penalty: "₹1,000",
        notes: "Light Motor Vehicle (LMV).",
    },
    Violation {
        code: "SPD_183_MHV",
        name: "Speeding (Medium/Heavy Vehicle)",
        section: "Section 183",
        penalty: "₹2,000",
        notes: "Medium/Heavy Vehicle.",
    },
    Violation {
        code: "DNG_184",
        name: "Dangerous Driving",
        section: "Section 184",
        penalty: "₹1,000 to ₹5,000 (First Offense)",
        notes: "Includes: Red Light Jumping, Stop Sign Violation, Use of Handheld Device.",
    },
    Violation {
        code: "SB_194B",
        name: "Driving without Safety Belt",
        section: "Section 194B",
        penalty: "₹1,000",
        notes: "Safety belt violation.",
    },
    Violation {
        code: "TR_194C",
        name: "Triple Riding on Two-Wheeler",
        section: "Section 194C",
        penalty: "₹1,000 + License Disqualification",
        notes: "Triple riding prohibited.",
    },
    Violation {
        code: "HL_194D",
        name: "Riding without Helmet",
        section: "Section 194D",
        penalty: "₹1,000 + License Disqualification",
        notes: "Helmet mandatory on two-wheeler.",
    },
    Violation {
        code: "EM_194E",
        name: "Failure to yield to Emergency Vehicles",
        section: "Section 194E",
        penalty: "₹10,000",
        notes: "Must yield to ambulance/fire/police vehicles.",
    },
];

pub const SIGN_GROUPS: &[SignGroup] = &[
    SignGroup {
        name: "Mandatory (IRC:67-2022)",
        signs: &["Speed Limit 50", "No Parking", "No U-Turn", "Compulsory Ahead Only"],
    },
    SignGroup {
        name: "Cautionary (IRC:67-2022)",
        signs: &["School Ahead", "Pedestrian Crossing", "Road Narrows", "Speed Breaker"],
    },
    SignGroup {
        name: "New Additions (IRC:67-2022, 2022 updates)",
        signs: &["EV Charging Station", "Bus Lane"],
    },
];

impl Violation {
    /// Section with the act name, e.g. "Motor Vehicles Act, 1988 - Section 183"
    pub fn citation(&self) -> String {
        format!("{} - {}", MVA, self.section)
    }
}

pub fn violation(code: &str) -> Option<&'static Violation> {
    VIOLATIONS.iter().find(|v| v.code == code)
}

pub fn violation_codes() -> impl Iterator<Item = &'static str> {
    VIOLATIONS.iter().map(|v| v.code)
}

/// Signs in a group; unknown groups have none.
pub fn signs_for_group(group: &str) -> &'static [&'static str] {
    SIGN_GROUPS
        .iter()
        .find(|g| g.name == group)
        .map(|g| g.signs)
        .unwrap_or(&[])
}

/// Whole catalog in one serializable value
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Catalog {
    pub act: &'static str,
    pub violations: &'static [Violation],
    pub sign_groups: &'static [SignGroup],
}

pub fn catalog() -> Catalog {
    Catalog {
        act: MVA,
        violations: VIOLATIONS,
        sign_groups: SIGN_GROUPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_lookup() {
        let v = violation("EM_194E").unwrap();
        assert_eq!(v.penalty, "₹10,000");
        assert_eq!(v.citation(), "Motor Vehicles Act, 1988 - Section 194E");
        assert!(violation("XX_000").is_none());
        assert!(violation("em_194e").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = violation_codes().collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
        assert_eq!(total, 7);
    }

    #[test]
    fn test_sign_groups() {
        assert_eq!(signs_for_group("New Additions (IRC:67-2022, 2022 updates)").len(), 2);
        assert!(signs_for_group("Informatory").is_empty());
    }

    #[test]
    fn test_catalog_serializes() {
        let value = serde_json::to_value(catalog()).unwrap();
        assert_eq!(value["violations"][0]["code"], "SPD_183_LMV");
        assert_eq!(value["sign_groups"][1]["signs"][3], "Speed Breaker");
    }
}
