//! [`ZoneRulesGroupRegistry`]: the process-wide map from `group_id` to the providers registered
//! for it, and floating-version resolution across those providers.

use crate::error::CalendricalError;
use crate::resource_provider::ZoneRulesProvider;
use crate::rules::ZoneRules;
use crate::CalendricalResult;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(any(feature = "std", test))]
use hashbrown::HashMap;
#[cfg(any(feature = "std", test))]
use std::sync::RwLock;

/// One registered provider.
struct Entry {
    provider: Box<dyn ZoneRulesProvider + Send + Sync>,
}

/// Maps `group_id` to the providers registered for it. A region can be served by more than one
/// provider (e.g. an embedded baseline plus a hot-reloaded update); floating-version lookups
/// consider every version every registered provider for the group exposes.
#[cfg(any(feature = "std", test))]
pub struct ZoneRulesGroupRegistry {
    groups: RwLock<HashMap<String, Vec<Entry>>>,
}

#[cfg(any(feature = "std", test))]
impl Default for ZoneRulesGroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(feature = "std", test))]
impl ZoneRulesGroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `provider` under `group_id`. Multiple providers may be registered under the
    /// same group; later registrations are consulted first by [`Self::resolve`].
    pub fn register_provider(&self, group_id: &str, provider: Box<dyn ZoneRulesProvider + Send + Sync>) {
        let mut groups = self.groups.write().unwrap();
        groups
            .entry(String::from(group_id))
            .or_default()
            .push(Entry { provider });
    }

    /// Resolves `(group_id, region_id)` at a specific version.
    pub fn resolve_fixed(&self, group_id: &str, region_id: &str, version_id: &str) -> CalendricalResult<ZoneRules> {
        let groups = self.groups.read().unwrap();
        let entries = groups
            .get(group_id)
            .ok_or_else(|| CalendricalError::config().with_message("unknown zone-rules group"))?;
        for entry in entries.iter().rev() {
            if entry.provider.available_versions().iter().any(|v| v == version_id) {
                return entry.provider.rules(region_id, version_id);
            }
        }
        Err(CalendricalError::config().with_message("version not found in group"))
    }

    /// Resolves `(group_id, region_id)` at the floating (most recent) version: the
    /// lexicographically greatest version string among every registered provider's versions
    /// that also carries `region_id`.
    pub fn resolve_floating(&self, group_id: &str, region_id: &str) -> CalendricalResult<ZoneRules> {
        let groups = self.groups.read().unwrap();
        let entries = groups
            .get(group_id)
            .ok_or_else(|| CalendricalError::config().with_message("unknown zone-rules group"))?;

        let mut best: Option<(String, usize)> = None;
        for (idx, entry) in entries.iter().enumerate() {
            if !entry.provider.available_regions().iter().any(|r| r == region_id) {
                continue;
            }
            for version in entry.provider.available_versions() {
                let is_better = match &best {
                    None => true,
                    Some((best_version, _)) => version > *best_version,
                };
                if is_better {
                    best = Some((version, idx));
                }
            }
        }

        let (version, idx) = best.ok_or_else(|| {
            CalendricalError::config().with_message("region not found in any provider for group")
        })?;
        entries[idx].provider.rules(region_id, &version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use crate::naive::WeekDay;
    use crate::offset::ZoneOffset;
    use crate::resource_provider::ResourceZoneRulesProvider;
    use crate::rules::StandardZoneRules;
    use crate::transition_rule::{TimeDefinition, ZoneOffsetTransitionRule};
    use alloc::boxed::Box;
    use alloc::vec;

    fn provider_with_version(version_id: &str) -> ResourceZoneRulesProvider {
        let cet = ZoneOffset::from_hms(1, 0, 0).unwrap();
        let cest = ZoneOffset::from_hms(2, 0, 0).unwrap();
        let spring = ZoneOffsetTransitionRule::new(
            3, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet, cet, cest,
        )
        .unwrap();
        let autumn = ZoneOffsetTransitionRule::new(
            10, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet, cest, cet,
        )
        .unwrap();
        let rules = StandardZoneRules::new(vec![], vec![cet], vec![], vec![cet], vec![], vec![spring, autumn]).unwrap();
        let rule_bytes = crate::archive::serialize_rules(&rules);
        let archive = Archive {
            group_id: "iana".into(),
            versions: vec![version_id.into()],
            regions: vec!["Europe/Paris".into()],
            version_entries: vec![vec![(0, 0)]],
            rule_pool: vec![rule_bytes],
        };
        ResourceZoneRulesProvider::new(archive)
    }

    #[test]
    fn resolves_fixed_version() {
        let registry = ZoneRulesGroupRegistry::new();
        registry.register_provider("iana", Box::new(provider_with_version("2023c")));
        assert!(registry.resolve_fixed("iana", "Europe/Paris", "2023c").is_ok());
        assert!(registry.resolve_fixed("iana", "Europe/Paris", "2099z").is_err());
    }

    #[test]
    fn floating_picks_lexicographically_greatest_version() {
        let registry = ZoneRulesGroupRegistry::new();
        registry.register_provider("iana", Box::new(provider_with_version("2023c")));
        registry.register_provider("iana", Box::new(provider_with_version("2024a")));
        // Both providers carry Europe/Paris; the floating version should prefer "2024a".
        assert!(registry.resolve_floating("iana", "Europe/Paris").is_ok());
    }

    #[test]
    fn unknown_group_is_an_error() {
        let registry = ZoneRulesGroupRegistry::new();
        assert!(registry.resolve_floating("unknown", "Europe/Paris").is_err());
    }
}
