//! Ties [`crate::parser::parse_source`] and [`crate::builder::ZoneRulesBuilder`] together: turns
//! raw TZDB source text into a [`tzcore_provider::archive::Archive`] ready to hand to a
//! [`tzcore_provider::resource_provider::ResourceZoneRulesProvider`].

use crate::builder::ZoneRulesBuilder;
use crate::parser::ParsedSource;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::RangeInclusive;
use hashbrown::HashMap;
use tzcore_provider::archive::{serialize_rules, Archive};
use tzcore_provider::error::CalendricalError;
use tzcore_provider::rules::StandardZoneRules;
use tzcore_provider::CalendricalResult;

/// The year span over which named rule sets are walked and materialised into concrete
/// transitions; years outside it are served only through `last_rules` extrapolation.
#[derive(Debug, Clone)]
pub struct ZoneRulesCompileSettings {
    pub year_range: RangeInclusive<i32>,
}

impl Default for ZoneRulesCompileSettings {
    fn default() -> Self {
        Self { year_range: 1900..=2100 }
    }
}

/// Resolves `region_name` through `Link` aliasing (if any) and materialises its rules.
pub fn compile_region(
    source: &ParsedSource,
    region_name: &str,
    settings: &ZoneRulesCompileSettings,
) -> CalendricalResult<StandardZoneRules> {
    let target = resolve_link(source, region_name);
    ZoneRulesBuilder::new(settings.year_range.clone()).build(source, target)
}

fn resolve_link<'a>(source: &'a ParsedSource, region_name: &'a str) -> &'a str {
    source
        .links
        .iter()
        .find(|l| l.link_name == region_name)
        .map_or(region_name, |l| l.target.as_str())
}

/// Compiles every zone (and every `Link` alias) named in `source` into one archive, deduplicating
/// identical rule sets so a `Link`'s region shares its target's rule-pool entry.
pub fn compile_archive(
    group_id: &str,
    version_id: &str,
    source: &ParsedSource,
    settings: &ZoneRulesCompileSettings,
) -> CalendricalResult<Archive> {
    let mut regions: Vec<String> = source.zones.iter().map(|z| z.name.clone()).collect();
    regions.extend(source.links.iter().map(|l| l.link_name.clone()));
    regions.sort();
    regions.dedup();

    let builder = ZoneRulesBuilder::new(settings.year_range.clone());
    let mut rule_pool: Vec<Vec<u8>> = Vec::new();
    let mut rule_index_by_target: HashMap<&str, u16> = HashMap::new();
    let mut entries: Vec<(u16, u16)> = Vec::with_capacity(regions.len());

    for (region_index, region_name) in regions.iter().enumerate() {
        let target = resolve_link(source, region_name);
        let rule_index = match rule_index_by_target.get(target) {
            Some(&idx) => idx,
            None => {
                let rules = builder.build(source, target)?;
                let idx = u16::try_from(rule_pool.len())
                    .map_err(|_| CalendricalError::config().with_message("too many distinct rule sets for one archive"))?;
                rule_pool.push(serialize_rules(&rules));
                rule_index_by_target.insert(target, idx);
                idx
            }
        };
        entries.push((region_index as u16, rule_index));
    }

    drop(rule_index_by_target);

    Ok(Archive {
        group_id: group_id.to_string(),
        versions: alloc::vec![version_id.to_string()],
        regions,
        version_entries: alloc::vec![entries],
        rule_pool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    const EU_PARIS: &str = "\
Rule\tEU\t1981\tmax\t-\tMar\tlastSun\t 1:00u\t1:00\tS
Rule\tEU\t1996\tmax\t-\tOct\tlastSun\t 1:00u\t0\t-
Zone Europe/Paris\t1:00\tEU\tCE%sT
Link Europe/Paris Europe/Vaduz
";

    #[test]
    fn compiles_archive_with_link_sharing_rule_pool_entry() {
        let source = parse_source(EU_PARIS).unwrap();
        let settings = ZoneRulesCompileSettings { year_range: 2009..=2012 };
        let archive = compile_archive("iana", "2024a", &source, &settings).unwrap();

        assert_eq!(archive.regions, alloc::vec!["Europe/Paris", "Europe/Vaduz"]);
        assert_eq!(archive.rule_pool.len(), 1);

        let paris = archive.rules_for("2024a", "Europe/Paris").unwrap();
        let vaduz = archive.rules_for("2024a", "Europe/Vaduz").unwrap();
        assert_eq!(paris, vaduz);
    }

    #[test]
    fn compile_region_follows_link() {
        let source = parse_source(EU_PARIS).unwrap();
        let settings = ZoneRulesCompileSettings { year_range: 2009..=2012 };
        let direct = compile_region(&source, "Europe/Paris", &settings).unwrap();
        let via_link = compile_region(&source, "Europe/Vaduz", &settings).unwrap();
        assert_eq!(direct, via_link);
    }
}
