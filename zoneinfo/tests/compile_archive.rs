//! End-to-end: TZDB source text compiled into an archive, then queried through the runtime
//! provider exactly the way a consumer embedding this crate's output would.

use tzcore_provider::resource_provider::{ResourceZoneRulesProvider, ZoneRulesProvider};
use tzcore_tzdb::{TzdbSource, ZoneRulesCompileSettings};

const SOURCE: &str = "\
Rule\tEU\t1981\tmax\t-\tMar\tlastSun\t 1:00u\t1:00\tS
Rule\tEU\t1996\tmax\t-\tOct\tlastSun\t 1:00u\t0\t-
Rule\tUS\t2007\tmax\t-\tMar\tSun>=8\t2:00\t1:00\tD
Rule\tUS\t2007\tmax\t-\tNov\tSun>=1\t2:00\t0\tS
Zone Europe/Paris\t1:00\tEU\tCE%sT
Zone America/New_York\t-5:00\tUS\tE%sT
";

fn epoch_seconds(year: i32, month: u8, day: u8) -> i64 {
    tzcore_provider::naive::NaiveDateTime::new(year, month, day, 0, 0, 0)
        .unwrap()
        .to_epoch_seconds(0)
}

#[test]
fn compiles_and_queries_two_zones() {
    let source = TzdbSource::from_str(SOURCE).unwrap();
    let settings = ZoneRulesCompileSettings { year_range: 2015..=2022 };
    let archive = source.compile_archive("iana", "2024a", &settings).unwrap();

    assert_eq!(archive.regions, vec!["America/New_York", "Europe/Paris"]);

    let provider = ResourceZoneRulesProvider::new(archive);

    let paris_winter = provider.rules("Europe/Paris", "2024a").unwrap();
    let paris_summer = paris_winter.clone();
    assert_eq!(
        paris_winter.offset_at_instant(epoch_seconds(2020, 1, 1)).unwrap().total_seconds(),
        3_600
    );
    assert_eq!(
        paris_summer.offset_at_instant(epoch_seconds(2020, 7, 1)).unwrap().total_seconds(),
        7_200
    );

    let ny = provider.rules("America/New_York", "2024a").unwrap();
    assert_eq!(
        ny.offset_at_instant(epoch_seconds(2020, 1, 1)).unwrap().total_seconds(),
        -18_000
    );
    assert_eq!(
        ny.offset_at_instant(epoch_seconds(2020, 7, 1)).unwrap().total_seconds(),
        -14_400
    );
}
