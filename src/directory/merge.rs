//! Supplementary contact file merge
//!
//! The file is a JSON object keyed by authority code:
//!
//! ```json
//! { "MH": { "defaults": ["a@x.in"], "overrides": { "pune": ["b@x.in"] } } }
//! ```
//!
//! Merging only ever appends unique addresses. Running it twice is a no-op.

use super::{ContactDirectory, DirectoryEntry};
use crate::error::{SentinelError, SentinelResult};
use crate::types::AuthorityCode;
use flate2::read::GzDecoder;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parsed supplementary file (same shape as a directory entry per code)
pub type Supplement = BTreeMap<String, DirectoryEntry>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub codes_added: usize,
    pub addresses_added: usize,
    pub skipped_codes: Vec<String>,
}

/// Read a supplement from `.json` or `.json.gz`.
pub fn load_supplement(path: &Path) -> SentinelResult<Supplement> {
    let file = File::open(path)
        .map_err(|e| SentinelError::Directory(format!("{}: {}", path.display(), e)))?;

    let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    serde_json::from_reader(BufReader::new(reader))
        .map_err(|e| SentinelError::Directory(format!("{}: {}", path.display(), e)))
}

impl ContactDirectory {
    /// Additively merge a parsed supplement.
    pub fn merge(&mut self, supplement: &Supplement) -> MergeStats {
        let mut stats = MergeStats::default();

        for (raw_code, addition) in supplement {
            let Some(code) = AuthorityCode::new(raw_code) else {
                warn!("Skipping supplementary entry with invalid code {:?}", raw_code);
                stats.skipped_codes.push(raw_code.clone());
                continue;
            };

            if !self.contains(&code) {
                stats.codes_added += 1;
            }

            let defaults: Vec<&str> = addition.defaults.iter().map(String::as_str).collect();
            stats.addresses_added += self.insert_defaults(code.clone(), &defaults);

            for (keyword, addresses) in &addition.overrides {
                let addresses: Vec<&str> = addresses.iter().map(String::as_str).collect();
                stats.addresses_added += self.insert_override(code.clone(), keyword, &addresses);
            }
        }

        stats
    }

    /// Load and merge a supplementary file.
    ///
    /// On error nothing is merged and the current table stays authoritative.
    pub fn merge_file(&mut self, path: &Path) -> SentinelResult<MergeStats> {
        let supplement = load_supplement(path)?;
        let stats = self.merge(&supplement);
        info!(
            "Merged contacts from {}: {} new codes, {} new addresses",
            path.display(),
            stats.codes_added,
            stats.addresses_added
        );
        Ok(stats)
    }
}
