//! Implementation note: this library is not designed for runtime speed. It exists to turn TZDB
//! source text into a [`tzcore_provider::archive::Archive`] at build time, on a modestly sized
//! dataset, not to serve lookups against an arbitrarily large one.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod compiler;
pub mod grammar;
pub mod parser;

#[doc(inline)]
pub use builder::ZoneRulesBuilder;
#[doc(inline)]
pub use compiler::{compile_archive, compile_region, ZoneRulesCompileSettings};
#[doc(inline)]
pub use parser::{parse_source, ParsedSource};

use alloc::string::String;
use tzcore_provider::archive::Archive;
use tzcore_provider::rules::StandardZoneRules;
use tzcore_provider::{CalendricalError, CalendricalResult};

/// The well-known top-level TZDB source files making up the IANA database proper (the
/// `factory` and `leapseconds` special files are handled elsewhere and are not zone data).
pub const ZONEINFO_FILES: [&str; 9] = [
    "africa",
    "antarctica",
    "asia",
    "australasia",
    "backward",
    "etcetera",
    "europe",
    "northamerica",
    "southamerica",
];

/// Errors reading TZDB source files from disk, on top of the ordinary [`CalendricalError`]
/// parse/compile failures.
#[derive(Debug)]
pub enum TzdbError {
    Calendrical(CalendricalError),
    #[cfg(feature = "std")]
    Io(String),
}

impl From<CalendricalError> for TzdbError {
    fn from(value: CalendricalError) -> Self {
        Self::Calendrical(value)
    }
}

/// One or more concatenated TZDB source files, tokenized once and ready to compile zones or
/// whole archives out of.
#[derive(Debug, Clone, Default)]
pub struct TzdbSource {
    parsed: ParsedSource,
}

impl TzdbSource {
    pub fn from_str(text: &str) -> CalendricalResult<Self> {
        Ok(Self {
            parsed: parse_source(text)?,
        })
    }

    /// Reads and parses a single TZDB source file (e.g. `europe`).
    #[cfg(feature = "std")]
    pub fn from_filepath<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TzdbError> {
        use std::string::ToString;
        let text = std::fs::read_to_string(path).map_err(|e| TzdbError::Io(e.to_string()))?;
        Ok(Self::from_str(&text)?)
    }

    /// Reads every file named in [`ZONEINFO_FILES`] out of `dir` (skipping any that don't
    /// exist) and parses them as one concatenated source.
    #[cfg(feature = "std")]
    pub fn from_directory<P: AsRef<std::path::Path>>(dir: P) -> Result<Self, TzdbError> {
        use std::string::ToString;
        let mut combined = String::new();
        for filename in ZONEINFO_FILES {
            let file_path = dir.as_ref().join(filename);
            if !file_path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&file_path).map_err(|e| TzdbError::Io(e.to_string()))?;
            combined.push_str(&text);
            combined.push('\n');
        }
        Ok(Self::from_str(&combined)?)
    }

    #[must_use]
    pub fn parsed(&self) -> &ParsedSource {
        &self.parsed
    }

    pub fn compile_region(
        &self,
        region_name: &str,
        settings: &ZoneRulesCompileSettings,
    ) -> CalendricalResult<StandardZoneRules> {
        compile_region(&self.parsed, region_name, settings)
    }

    pub fn compile_archive(
        &self,
        group_id: &str,
        version_id: &str,
        settings: &ZoneRulesCompileSettings,
    ) -> CalendricalResult<Archive> {
        compile_archive(group_id, version_id, &self.parsed, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EU_PARIS: &str = "\
Rule\tEU\t1981\tmax\t-\tMar\tlastSun\t 1:00u\t1:00\tS
Rule\tEU\t1996\tmax\t-\tOct\tlastSun\t 1:00u\t0\t-
Zone Europe/Paris\t1:00\tEU\tCE%sT
";

    #[test]
    fn source_compiles_region_and_archive() {
        let source = TzdbSource::from_str(EU_PARIS).unwrap();
        let settings = ZoneRulesCompileSettings { year_range: 2009..=2012 };

        let rules = source.compile_region("Europe/Paris", &settings).unwrap();
        let jul_2011 = tzcore_provider::naive::NaiveDateTime::new(2011, 7, 1, 0, 0, 0)
            .unwrap()
            .to_epoch_seconds(0);
        assert_eq!(rules.offset_at_instant(jul_2011).unwrap().total_seconds(), 7_200);

        let archive = source.compile_archive("iana", "2024a", &settings).unwrap();
        assert_eq!(archive.regions, alloc::vec!["Europe/Paris"]);
    }
}
