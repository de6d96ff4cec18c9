//! Built-in contact table, 2025 revision.
//!
//! Locality overrides list the full address set for that locality; they stand in
//! for the state defaults rather than adding to them.

pub const DIRECTORY_VERSION: &str = "2025";

pub const DEFAULT_ADDRESSES: &[(&str, &[&str])] = &[
    ("DL", &["addlcp.tfchq@delhipolice.gov.in"]),
    ("MH", &["sp.hsp.hq@mahapolice.gov.in"]),
    ("KA", &["bangloretrafficpolice@gmail.com"]),
    ("TN", &["cctnstn@tn.gov.in"]),
    ("UP", &["traffic_dir@uppolice.gov.in"]),
    ("HR", &["igp.lo@hry.nic.in"]),
    ("KL", &["sptrafficsz.pol@kerala.gov.in"]),
    ("GJ", &["dig-traffic-ahd@gujarat.gov.in"]),
    ("WB", &["dctp@kolkatatrafficpolice.gov.in"]),
    ("TS", &["addlcptraffic@hyd.tspolice.gov.in"]),
    ("PB", &["trafficpolicepunjab@gmail.com"]),
    ("RJ", &["adgp.traffic@rajpolice.gov.in"]),
    ("GA", &["sp_traffic@goapolice.gov.in"]),
];

/// (code, locality keyword, addresses)
pub const LOCALITY_OVERRIDES: &[(&str, &str, &[&str])] = &[
    (
        "MH",
        "mumbai",
        &["cp.mumbai.jtcp.traf@mahapolice.gov.in", "sp.hsp.hq@mahapolice.gov.in"],
    ),
    (
        "HR",
        "gurugram",
        &["dcp.trafficggn@hry.nic.in", "igp.lo@hry.nic.in"],
    ),
    (
        "HR",
        "gurgaon",
        &["dcp.trafficggn@hry.nic.in", "igp.lo@hry.nic.in"],
    ),
];

/// Administrative region names as reported by the geocoder → authority code.
pub const REGION_CODES: &[(&str, &str)] = &[
    ("Delhi", "DL"),
    ("National Capital Territory of Delhi", "DL"),
    ("Maharashtra", "MH"),
    ("Karnataka", "KA"),
    ("Tamil Nadu", "TN"),
    ("Uttar Pradesh", "UP"),
    ("Haryana", "HR"),
    ("Kerala", "KL"),
    ("Gujarat", "GJ"),
    ("West Bengal", "WB"),
    ("Telangana", "TS"),
    ("Punjab", "PB"),
    ("Rajasthan", "RJ"),
    ("Goa", "GA"),
];
