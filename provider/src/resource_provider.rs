//! [`ZoneRulesProvider`]: the trait a zone-rules source implements, and
//! [`ResourceZoneRulesProvider`]: the archive-backed implementation that lazily materialises
//! and caches individual [`StandardZoneRules`] records out of a loaded [`Archive`].

use crate::archive::Archive;
use crate::rules::{StandardZoneRules, ZoneRules};
use crate::CalendricalResult;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(any(feature = "std", test))]
use hashbrown::HashMap;
#[cfg(any(feature = "std", test))]
use std::sync::RwLock;

/// A source of [`ZoneRules`] for `(region_id, version_id)` pairs within one group.
pub trait ZoneRulesProvider {
    /// The versions this provider carries data for, in archive order.
    fn available_versions(&self) -> Vec<String>;
    /// The regions this provider carries data for, in archive order.
    fn available_regions(&self) -> Vec<String>;
    /// Looks up and materialises the rules for `(region_id, version_id)`.
    fn rules(&self, region_id: &str, version_id: &str) -> CalendricalResult<ZoneRules>;
}

/// Key used to cache individual materialised records: `(region_id, version_id)`.
#[cfg(any(feature = "std", test))]
type RecordCache = RwLock<HashMap<(String, String), StandardZoneRules>>;

/// Loads a [`ZoneRulesProvider`] from an in-memory [`Archive`], decoding each
/// `(region, version)` rule record the first time it is requested and caching the result.
///
/// Under pure `no_std` (no `std` feature, not under test) each lookup decodes fresh: there is
/// no approved lock-free `no_std` map in the crate's dependency stack, so this cache is a
/// `std`-only convenience rather than a structural requirement.
pub struct ResourceZoneRulesProvider {
    archive: Archive,
    #[cfg(any(feature = "std", test))]
    cache: RecordCache,
}

impl ResourceZoneRulesProvider {
    #[must_use]
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            #[cfg(any(feature = "std", test))]
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Parses and loads an archive from its serialised byte form.
    pub fn from_bytes(bytes: &[u8]) -> CalendricalResult<Self> {
        Ok(Self::new(Archive::deserialize(bytes)?))
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.archive.group_id
    }

    fn materialize(&self, region_id: &str, version_id: &str) -> CalendricalResult<StandardZoneRules> {
        let result = self.archive.rules_for(version_id, region_id);
        #[cfg(feature = "log")]
        if result.is_err() {
            log::warn!("corrupt or missing archive record for {region_id}#{version_id}");
        }
        result
    }
}

impl ZoneRulesProvider for ResourceZoneRulesProvider {
    fn available_versions(&self) -> Vec<String> {
        self.archive.versions.clone()
    }

    fn available_regions(&self) -> Vec<String> {
        self.archive.regions.clone()
    }

    fn rules(&self, region_id: &str, version_id: &str) -> CalendricalResult<ZoneRules> {
        #[cfg(any(feature = "std", test))]
        {
            let key = (String::from(region_id), String::from(version_id));
            if let Some(hit) = self.cache.read().unwrap().get(&key) {
                return Ok(ZoneRules::Standard(hit.clone()));
            }
            let rules = self.materialize(region_id, version_id)?;
            #[cfg(feature = "log")]
            log::debug!("materialised zone rules for {region_id}#{version_id}");
            self.cache
                .write()
                .unwrap()
                .entry(key)
                .or_insert_with(|| rules.clone());
            Ok(ZoneRules::Standard(rules))
        }
        #[cfg(not(any(feature = "std", test)))]
        {
            Ok(ZoneRules::Standard(self.materialize(region_id, version_id)?))
        }
    }
}

impl core::fmt::Debug for ResourceZoneRulesProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceZoneRulesProvider")
            .field("group_id", &self.archive.group_id)
            .finish_non_exhaustive()
    }
}
