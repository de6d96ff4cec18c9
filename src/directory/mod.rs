//! Authority contact directory
//!
//! Process-wide reference data: authority code → default notification
//! addresses, optional locality overrides, and the region-name table used to
//! turn geocoder output into a code. Read-only once startup merging is done.

pub mod builtin;
pub mod merge;

pub use builtin::DIRECTORY_VERSION;
pub use merge::{MergeStats, Supplement};

use crate::types::AuthorityCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Addresses for one authority
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Ordered set: insertion order kept, no duplicates
    #[serde(default)]
    pub defaults: Vec<String>,
    /// Lower-case locality keyword → replacement address set
    #[serde(default)]
    pub overrides: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Address set for an event whose sub-region text is `locality_text`.
    ///
    /// Every override keyword found in the text (case-insensitive substring)
    /// contributes its addresses; if none match, the defaults apply.
    pub fn addresses_for_locality(&self, locality_text: &str) -> Vec<&str> {
        if self.overrides.is_empty() {
            return self.defaults.iter().map(String::as_str).collect();
        }

        let haystack = locality_text.to_lowercase();
        let mut matched: Vec<&str> = Vec::new();
        for (keyword, addresses) in &self.overrides {
            if keyword.is_empty() || !haystack.contains(keyword.as_str()) {
                continue;
            }
            for address in addresses {
                if !matched.contains(&address.as_str()) {
                    matched.push(address);
                }
            }
        }

        if matched.is_empty() {
            self.defaults.iter().map(String::as_str).collect()
        } else {
            matched
        }
    }
}

pub(crate) fn push_unique(list: &mut Vec<String>, address: &str) -> bool {
    let address = address.trim();
    if address.is_empty() || list.iter().any(|a| a == address) {
        return false;
    }
    list.push(address.to_string());
    true
}

#[derive(Clone, Debug, Serialize)]
pub struct ContactDirectory {
    version: String,
    entries: BTreeMap<AuthorityCode, DirectoryEntry>,
    regions: BTreeMap<String, AuthorityCode>,
}

impl ContactDirectory {
    /// Empty directory, mostly useful for tests and custom tables.
    pub fn empty(version: &str) -> Self {
        Self {
            version: version.to_string(),
            entries: BTreeMap::new(),
            regions: BTreeMap::new(),
        }
    }

    /// Directory populated from the built-in 2025 tables
    pub fn builtin() -> Self {
        let mut directory = Self::empty(DIRECTORY_VERSION);

        for (code, addresses) in builtin::DEFAULT_ADDRESSES {
            if let Some(code) = AuthorityCode::new(code) {
                let entry = directory.entries.entry(code).or_default();
                for address in addresses.iter() {
                    push_unique(&mut entry.defaults, address);
                }
            }
        }

        for (code, keyword, addresses) in builtin::LOCALITY_OVERRIDES {
            if let Some(code) = AuthorityCode::new(code) {
                directory.insert_override(code, keyword, addresses);
            }
        }

        for (name, code) in builtin::REGION_CODES {
            if let Some(code) = AuthorityCode::new(code) {
                directory.regions.insert(name.to_string(), code);
            }
        }

        directory
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &AuthorityCode> {
        self.entries.keys()
    }

    pub fn entry(&self, code: &AuthorityCode) -> Option<&DirectoryEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &AuthorityCode) -> bool {
        self.entries.contains_key(code)
    }

    /// Default addresses; absent codes yield an empty slice.
    pub fn defaults(&self, code: &AuthorityCode) -> &[String] {
        self.entries
            .get(code)
            .map(|e| e.defaults.as_slice())
            .unwrap_or(&[])
    }

    /// Location-axis addresses with locality overrides applied.
    pub fn location_addresses(&self, code: &AuthorityCode, locality_text: &str) -> Vec<&str> {
        self.entries
            .get(code)
            .map(|e| e.addresses_for_locality(locality_text))
            .unwrap_or_default()
    }

    /// Exact-match region name lookup. No approximate matching.
    pub fn region_code(&self, region_name: &str) -> Option<&AuthorityCode> {
        self.regions.get(region_name)
    }

    /// Add (or extend) an entry's default addresses. Returns how many were new.
    pub fn insert_defaults(&mut self, code: AuthorityCode, addresses: &[&str]) -> usize {
        let entry = self.entries.entry(code).or_default();
        addresses
            .iter()
            .filter(|a| push_unique(&mut entry.defaults, a))
            .count()
    }

    /// Add (or extend) a locality override. Returns how many addresses were new.
    pub fn insert_override(
        &mut self,
        code: AuthorityCode,
        keyword: &str,
        addresses: &[&str],
    ) -> usize {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return 0;
        }
        let entry = self.entries.entry(code).or_default();
        let list = entry.overrides.entry(keyword).or_default();
        addresses.iter().filter(|a| push_unique(list, a)).count()
    }

    pub fn insert_region(&mut self, region_name: &str, code: AuthorityCode) {
        self.regions.insert(region_name.to_string(), code);
    }
}

impl Default for ContactDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> AuthorityCode {
        AuthorityCode::new(s).unwrap()
    }

    #[test]
    fn test_builtin_covers_every_region_code() {
        let directory = ContactDirectory::builtin();
        assert_eq!(directory.version(), "2025");
        assert_eq!(directory.len(), 13);
        for (_, region_code) in builtin::REGION_CODES {
            assert!(directory.contains(&code(region_code)), "missing {}", region_code);
        }
    }

    #[test]
    fn test_absent_code_is_empty_not_error() {
        let directory = ContactDirectory::builtin();
        assert!(directory.defaults(&code("ZZ")).is_empty());
        assert!(directory.location_addresses(&code("ZZ"), "anything").is_empty());
        assert!(directory.entry(&code("ZZ")).is_none());
    }

    #[test]
    fn test_region_lookup_is_exact() {
        let directory = ContactDirectory::builtin();
        assert_eq!(directory.region_code("Maharashtra"), Some(&code("MH")));
        assert_eq!(directory.region_code("maharashtra"), None);
        assert_eq!(directory.region_code("Maharashtra State"), None);
        assert_eq!(
            directory.region_code("National Capital Territory of Delhi"),
            Some(&code("DL"))
        );
    }

    #[test]
    fn test_mumbai_override_matches_case_insensitively() {
        let directory = ContactDirectory::builtin();
        let addresses = directory.location_addresses(&code("MH"), "Mumbai Suburban BANDRA");
        assert!(addresses.contains(&"cp.mumbai.jtcp.traf@mahapolice.gov.in"));

        let pune = directory.location_addresses(&code("MH"), "Pune Haveli");
        assert_eq!(pune, vec!["sp.hsp.hq@mahapolice.gov.in"]);
    }

    #[test]
    fn test_override_replaces_defaults() {
        let mut directory = ContactDirectory::empty("test");
        directory.insert_defaults(code("XA"), &["state@x.in"]);
        directory.insert_override(code("XA"), "Metro", &["metro@x.in"]);

        assert_eq!(directory.location_addresses(&code("XA"), "metro city"), vec!["metro@x.in"]);
        assert_eq!(directory.location_addresses(&code("XA"), "village"), vec!["state@x.in"]);
    }

    #[test]
    fn test_multiple_matching_keywords_union() {
        let mut directory = ContactDirectory::empty("test");
        directory.insert_defaults(code("XA"), &["state@x.in"]);
        directory.insert_override(code("XA"), "north", &["north@x.in", "shared@x.in"]);
        directory.insert_override(code("XA"), "port", &["port@x.in", "shared@x.in"]);

        let addresses = directory.location_addresses(&code("XA"), "North Port District");
        assert_eq!(addresses.len(), 3);
        assert!(addresses.contains(&"north@x.in"));
        assert!(addresses.contains(&"port@x.in"));
        assert!(addresses.contains(&"shared@x.in"));
        assert!(!addresses.contains(&"state@x.in"));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut directory = ContactDirectory::empty("test");
        assert_eq!(directory.insert_defaults(code("XA"), &["a@x.in", "a@x.in", " "]), 1);
        assert_eq!(directory.insert_defaults(code("XA"), &["a@x.in"]), 0);
        assert_eq!(directory.defaults(&code("XA")), &["a@x.in".to_string()]);
    }
}
