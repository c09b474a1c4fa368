//! The binary zone-rules archive format: one `group_id`'s catalogue of versions, regions, and
//! deduplicated rule records.
//!
//! Big-endian throughout. Epoch seconds and offsets are both written through a small
//! variable-length encoding that favours the historically common small magnitudes, keeping a
//! multi-version, multi-region archive compact.

use crate::error::CalendricalError;
use crate::naive::NaiveDateTime;
use crate::offset::ZoneOffset;
use crate::rules::StandardZoneRules;
use crate::transition_rule::{TimeDefinition, ZoneOffsetTransitionRule};
use crate::CalendricalResult;
use alloc::string::String;
use alloc::vec::Vec;

const ARCHIVE_VERSION: u8 = 1;

/// A reader position into an archive byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> CalendricalResult<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(CalendricalError::overflow)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| CalendricalError::config().with_message("archive truncated"))?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> CalendricalResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> CalendricalResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i32(&mut self) -> CalendricalResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64(&mut self) -> CalendricalResult<i64> {
        let b = self.take(8)?;
        Ok(i64::from_be_bytes(b.try_into().unwrap()))
    }

    fn string(&mut self) -> CalendricalResult<String> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| CalendricalError::config().with_message("archive string is not valid utf-8"))
    }
}

fn write_u16_prefixed_string(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Writes the low 3 bytes of `value`, big-endian, sign-extended on read.
fn write_i24(out: &mut Vec<u8>, value: i32) {
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[1..4]);
}

fn read_i24(reader: &mut Reader<'_>) -> CalendricalResult<i32> {
    let b = reader.take(3)?;
    let sign = if b[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    Ok(i32::from_be_bytes([sign, b[0], b[1], b[2]]))
}

const I24_MIN: i64 = -8_388_608;
const I24_MAX: i64 = 8_388_607;

/// Encodes an epoch-second value. Prefix byte selects among `i16` hours-from-1970, `i24`
/// minutes-from-1970, or a full `i64` absolute value.
fn write_epoch_seconds(out: &mut Vec<u8>, seconds: i64) {
    const SECONDS_PER_HOUR: i64 = 3_600;
    const SECONDS_PER_MINUTE: i64 = 60;
    if seconds % SECONDS_PER_HOUR == 0 {
        let hours = seconds / SECONDS_PER_HOUR;
        if let Ok(hours) = i16::try_from(hours) {
            out.push(0);
            out.extend_from_slice(&hours.to_be_bytes());
            return;
        }
    }
    if seconds % SECONDS_PER_MINUTE == 0 {
        let minutes = seconds / SECONDS_PER_MINUTE;
        if (I24_MIN..=I24_MAX).contains(&minutes) {
            out.push(1);
            write_i24(out, minutes as i32);
            return;
        }
    }
    out.push(2);
    out.extend_from_slice(&seconds.to_be_bytes());
}

fn read_epoch_seconds(reader: &mut Reader<'_>) -> CalendricalResult<i64> {
    match reader.u8()? {
        0 => {
            let b = reader.take(2)?;
            Ok(i64::from(i16::from_be_bytes([b[0], b[1]])) * 3_600)
        }
        1 => Ok(i64::from(read_i24(reader)?) * 60),
        2 => reader.i64(),
        other => Err(CalendricalError::config().with_message(alloc::format!("unknown epoch-seconds tag {other}"))),
    }
}

/// Encodes a [`ZoneOffset`]. Prefix byte distinguishes minute-granularity (1 byte of minutes)
/// from second-granularity (3 bytes of seconds) offsets.
fn write_offset(out: &mut Vec<u8>, offset: ZoneOffset) {
    let total = offset.total_seconds();
    if total % 60 == 0 {
        let minutes = total / 60;
        if let Ok(minutes) = i8::try_from(minutes) {
            out.push(0);
            out.push(minutes as u8);
            return;
        }
    }
    out.push(1);
    write_i24(out, total);
}

fn read_offset(reader: &mut Reader<'_>) -> CalendricalResult<ZoneOffset> {
    match reader.u8()? {
        0 => {
            let minutes = reader.u8()? as i8;
            ZoneOffset::from_total_seconds(i32::from(minutes) * 60)
        }
        1 => {
            let total = read_i24(reader)?;
            ZoneOffset::from_total_seconds(total)
        }
        other => Err(CalendricalError::config().with_message(alloc::format!("unknown offset tag {other}"))),
    }
}

fn time_definition_tag(td: TimeDefinition) -> u8 {
    match td {
        TimeDefinition::Utc => 0,
        TimeDefinition::Standard => 1,
        TimeDefinition::Wall => 2,
    }
}

fn time_definition_from_tag(tag: u8) -> CalendricalResult<TimeDefinition> {
    match tag {
        0 => Ok(TimeDefinition::Utc),
        1 => Ok(TimeDefinition::Standard),
        2 => Ok(TimeDefinition::Wall),
        other => Err(CalendricalError::config().with_message(alloc::format!("unknown time_definition tag {other}"))),
    }
}

/// Serialises one [`StandardZoneRules`] into its self-describing per-rule byte stream.
pub fn serialize_rules(rules: &StandardZoneRules) -> Vec<u8> {
    let std_transitions = rules.standard_offset_transitions();
    let std_offsets = rules.standard_offsets();
    let wall_transitions = rules.wall_offset_transitions();
    let wall_offsets = rules.wall_offsets();
    let last_rules = rules.last_rules();

    let mut out = Vec::new();
    out.extend_from_slice(&(std_transitions.len() as i32).to_be_bytes());
    for &s in std_transitions {
        write_epoch_seconds(&mut out, s);
    }
    for &o in std_offsets {
        write_offset(&mut out, o);
    }

    out.extend_from_slice(&(wall_transitions.len() as i32).to_be_bytes());
    for &s in wall_transitions {
        write_epoch_seconds(&mut out, s);
    }
    for &o in wall_offsets {
        write_offset(&mut out, o);
    }

    out.push(last_rules.len() as u8);
    for rule in last_rules {
        rule.write_to(&mut out);
    }
    out
}

/// Deserialises one [`StandardZoneRules`] from its per-rule byte stream.
pub fn deserialize_rules(bytes: &[u8]) -> CalendricalResult<StandardZoneRules> {
    let mut reader = Reader::new(bytes);

    let s = reader.i32()? as usize;
    let mut std_transitions = Vec::with_capacity(s);
    for _ in 0..s {
        std_transitions.push(read_epoch_seconds(&mut reader)?);
    }
    let mut std_offsets = Vec::with_capacity(s + 1);
    for _ in 0..=s {
        std_offsets.push(read_offset(&mut reader)?);
    }

    let w = reader.i32()? as usize;
    let mut wall_transitions = Vec::with_capacity(w);
    for _ in 0..w {
        wall_transitions.push(read_epoch_seconds(&mut reader)?);
    }
    let mut wall_offsets = Vec::with_capacity(w + 1);
    for _ in 0..=w {
        wall_offsets.push(read_offset(&mut reader)?);
    }

    let l = reader.u8()? as usize;
    let mut last_rules = Vec::with_capacity(l);
    for _ in 0..l {
        last_rules.push(ZoneOffsetTransitionRule::read_from(&mut reader)?);
    }

    let savings_local_transitions = crate::rules::paired_local_transitions(&wall_transitions, &wall_offsets);

    StandardZoneRules::new(
        std_transitions,
        std_offsets,
        wall_transitions,
        wall_offsets,
        savings_local_transitions,
        last_rules,
    )
}

impl ZoneOffsetTransitionRule {
    fn write_to(&self, out: &mut Vec<u8>) {
        let (month, day_of_month_indicator, day_of_week, hour, minute, second, end_of_day, time_definition, standard_offset, offset_before, offset_after) =
            self.raw_fields();
        out.push(month);
        out.push(day_of_month_indicator as u8);
        out.push(day_of_week.map_or(255, |d| d as u8));
        out.push(hour);
        out.push(minute);
        out.push(second);
        out.push(u8::from(end_of_day));
        out.push(time_definition_tag(time_definition));
        write_offset(out, standard_offset);
        write_offset(out, offset_before);
        write_offset(out, offset_after);
    }

    fn read_from(reader: &mut Reader<'_>) -> CalendricalResult<Self> {
        let month = reader.u8()?;
        let day_of_month_indicator = reader.u8()? as i8;
        let day_of_week_tag = reader.u8()?;
        let day_of_week = if day_of_week_tag == 255 {
            None
        } else {
            Some(crate::naive::WeekDay::from_index(day_of_week_tag))
        };
        let hour = reader.u8()?;
        let minute = reader.u8()?;
        let second = reader.u8()?;
        let end_of_day = reader.u8()? != 0;
        let time_definition = time_definition_from_tag(reader.u8()?)?;
        let standard_offset = read_offset(reader)?;
        let offset_before = read_offset(reader)?;
        let offset_after = read_offset(reader)?;
        Self::new(
            month,
            day_of_month_indicator,
            day_of_week,
            hour,
            minute,
            second,
            end_of_day,
            time_definition,
            standard_offset,
            offset_before,
            offset_after,
        )
    }
}

/// One `group_id`'s full catalogue: every version id, every region id, per-version
/// `(region, rule)` index pairs, and the deduplicated rule byte pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub group_id: String,
    pub versions: Vec<String>,
    pub regions: Vec<String>,
    /// One entry per version, each a list of `(region_index, rule_index)` pairs.
    pub version_entries: Vec<Vec<(u16, u16)>>,
    pub rule_pool: Vec<Vec<u8>>,
}

impl Archive {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(ARCHIVE_VERSION);
        write_u16_prefixed_string(&mut out, &self.group_id);

        out.extend_from_slice(&(self.versions.len() as u16).to_be_bytes());
        for v in &self.versions {
            write_u16_prefixed_string(&mut out, v);
        }

        out.extend_from_slice(&(self.regions.len() as u16).to_be_bytes());
        for r in &self.regions {
            write_u16_prefixed_string(&mut out, r);
        }

        for entries in &self.version_entries {
            out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
            for &(region_idx, rule_idx) in entries {
                out.extend_from_slice(&region_idx.to_be_bytes());
                out.extend_from_slice(&rule_idx.to_be_bytes());
            }
        }

        out.extend_from_slice(&(self.rule_pool.len() as u16).to_be_bytes());
        for rule_bytes in &self.rule_pool {
            out.extend_from_slice(&(rule_bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(rule_bytes);
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> CalendricalResult<Self> {
        let mut reader = Reader::new(bytes);
        let version = reader.u8()?;
        if version != ARCHIVE_VERSION {
            return Err(CalendricalError::config().with_message(alloc::format!("unsupported archive version {version}")));
        }
        let group_id = reader.string()?;

        let version_count = reader.u16()? as usize;
        let mut versions = Vec::with_capacity(version_count);
        for _ in 0..version_count {
            versions.push(reader.string()?);
        }

        let region_count = reader.u16()? as usize;
        let mut regions = Vec::with_capacity(region_count);
        for _ in 0..region_count {
            regions.push(reader.string()?);
        }

        let mut version_entries = Vec::with_capacity(version_count);
        for _ in 0..version_count {
            let n = reader.u16()? as usize;
            let mut entries = Vec::with_capacity(n);
            for _ in 0..n {
                let region_index = reader.u16()?;
                let rule_index = reader.u16()?;
                entries.push((region_index, rule_index));
            }
            version_entries.push(entries);
        }

        let rule_count = reader.u16()? as usize;
        let mut rule_pool = Vec::with_capacity(rule_count);
        for _ in 0..rule_count {
            let len = reader.u16()? as usize;
            rule_pool.push(reader.take(len)?.to_vec());
        }

        Ok(Self {
            group_id,
            versions,
            regions,
            version_entries,
            rule_pool,
        })
    }

    /// Looks up and materialises the [`StandardZoneRules`] for `(version_id, region_id)`.
    pub fn rules_for(&self, version_id: &str, region_id: &str) -> CalendricalResult<StandardZoneRules> {
        let version_idx = self
            .versions
            .iter()
            .position(|v| v == version_id)
            .ok_or_else(|| CalendricalError::config().with_message("unknown version id"))?;
        let region_idx = self
            .regions
            .iter()
            .position(|r| r == region_id)
            .ok_or_else(|| CalendricalError::config().with_message("unknown region id"))?;
        let rule_idx = self.version_entries[version_idx]
            .iter()
            .find(|(r, _)| usize::from(*r) == region_idx)
            .map(|(_, rule_idx)| usize::from(*rule_idx))
            .ok_or_else(|| CalendricalError::config().with_message("region not present in version"))?;
        deserialize_rules(&self.rule_pool[rule_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::WeekDay;
    use alloc::vec;

    fn cet() -> ZoneOffset {
        ZoneOffset::from_hms(1, 0, 0).unwrap()
    }
    fn cest() -> ZoneOffset {
        ZoneOffset::from_hms(2, 0, 0).unwrap()
    }

    fn sample_rules() -> StandardZoneRules {
        let spring = ZoneOffsetTransitionRule::new(
            3, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cet(), cest(),
        )
        .unwrap();
        let autumn = ZoneOffsetTransitionRule::new(
            10, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cest(), cet(),
        )
        .unwrap();
        StandardZoneRules::new(
            vec![0],
            vec![cet(), cet()],
            vec![0],
            vec![cet(), cet()],
            vec![
                NaiveDateTime::new(1970, 1, 1, 0, 0, 0).unwrap(),
                NaiveDateTime::new(1970, 1, 1, 0, 0, 0).unwrap(),
            ],
            vec![spring, autumn],
        )
        .unwrap()
    }

    #[test]
    fn rules_roundtrip() {
        let rules = sample_rules();
        let bytes = serialize_rules(&rules);
        let back = deserialize_rules(&bytes).unwrap();
        assert_eq!(rules, back);
    }

    #[test]
    fn archive_roundtrip() {
        let rules_bytes = serialize_rules(&sample_rules());
        let archive = Archive {
            group_id: "iana".into(),
            versions: vec!["2024a".into()],
            regions: vec!["Europe/Paris".into()],
            version_entries: vec![vec![(0, 0)]],
            rule_pool: vec![rules_bytes],
        };
        let bytes = archive.serialize();
        let back = Archive::deserialize(&bytes).unwrap();
        assert_eq!(archive, back);
        let rules = back.rules_for("2024a", "Europe/Paris").unwrap();
        assert_eq!(rules.offset_at_instant(0).unwrap(), cet());
    }

    #[test]
    fn rejects_unknown_version_id() {
        let archive = Archive {
            group_id: "iana".into(),
            versions: vec!["2024a".into()],
            regions: vec!["Europe/Paris".into()],
            version_entries: vec![vec![(0, 0)]],
            rule_pool: vec![serialize_rules(&sample_rules())],
        };
        assert!(archive.rules_for("2099z", "Europe/Paris").is_err());
    }
}
