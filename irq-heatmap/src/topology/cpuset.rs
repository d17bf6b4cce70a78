//! CPU set parsing
//!
//! Sibling sets have been published in more than one encoding over the
//! kernel's history. Each encoding is a [`CpuSetFormat`]; discovery pairs a
//! sysfs file with the format it is written in (see [`SIBLING_SOURCES`]).

use std::collections::BTreeSet;

use crate::domain::CpuId;

/// A set of logical CPU ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuSet(BTreeSet<u32>);

impl CpuSet {
    #[must_use]
    pub fn contains(&self, cpu: CpuId) -> bool {
        self.0.contains(&cpu.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in increasing order
    pub fn iter(&self) -> impl Iterator<Item = CpuId> + '_ {
        self.0.iter().map(|&cpu| CpuId(cpu))
    }

    /// Number of members strictly below `cpu`
    #[must_use]
    pub fn count_below(&self, cpu: CpuId) -> usize {
        self.0.range(..cpu.0).count()
    }
}

impl FromIterator<u32> for CpuSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        CpuSet(iter.into_iter().collect())
    }
}

/// One on-disk encoding of a CPU set
pub trait CpuSetFormat: Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Decode `raw` (trailing newline allowed). `None` if it is not in this format.
    fn parse(&self, raw: &str) -> Option<CpuSet>;
}

/// Human readable list: `0,4,8-12`
pub struct RangeList;

impl CpuSetFormat for RangeList {
    fn name(&self) -> &'static str {
        "range list"
    }

    fn parse(&self, raw: &str) -> Option<CpuSet> {
        let raw = raw.trim();
        let mut cpus = BTreeSet::new();
        if raw.is_empty() {
            return Some(CpuSet(cpus));
        }

        for item in raw.split(',') {
            if let Some((start, end)) = item.split_once('-') {
                let start: u32 = start.trim().parse().ok()?;
                let end: u32 = end.trim().parse().ok()?;
                if start > end {
                    return None;
                }
                cpus.extend(start..=end);
            } else {
                cpus.insert(item.trim().parse().ok()?);
            }
        }

        Some(CpuSet(cpus))
    }
}

/// Hexadecimal bitmask in comma separated 32-bit words, most significant
/// word first: `00000000,00000011`
pub struct HexMask;

impl CpuSetFormat for HexMask {
    fn name(&self) -> &'static str {
        "hex mask"
    }

    fn parse(&self, raw: &str) -> Option<CpuSet> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let mut cpus = BTreeSet::new();
        for (word_index, word) in raw.rsplit(',').enumerate() {
            if word.is_empty() || word.len() > 8 {
                return None;
            }
            let bits = u32::from_str_radix(word, 16).ok()?;
            let base = u32::try_from(word_index).ok()?.checked_mul(32)?;
            for bit in 0..32 {
                if bits & (1 << bit) != 0 {
                    cpus.insert(base + bit);
                }
            }
        }

        Some(CpuSet(cpus))
    }
}

/// A sysfs topology file that holds a CPU's thread siblings, and its encoding
pub struct SiblingSource {
    pub file: &'static str,
    pub format: &'static dyn CpuSetFormat,
}

/// Tried in order; the first file that exists wins.
pub const SIBLING_SOURCES: &[SiblingSource] = &[
    SiblingSource {
        file: "thread_siblings_list",
        format: &RangeList,
    },
    SiblingSource {
        file: "thread_siblings",
        format: &HexMask,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(set: &CpuSet) -> Vec<u32> {
        set.iter().map(|c| c.0).collect()
    }

    #[test]
    fn test_range_list_mixed() {
        let set = RangeList.parse("0,4,8-12\n").unwrap();
        assert_eq!(ids(&set), vec![0, 4, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_range_list_single() {
        let set = RangeList.parse("5").unwrap();
        assert_eq!(ids(&set), vec![5]);
    }

    #[test]
    fn test_range_list_rejects_garbage() {
        assert!(RangeList.parse("0-").is_none());
        assert!(RangeList.parse("3-1").is_none());
        assert!(RangeList.parse("zz").is_none());
    }

    #[test]
    fn test_hex_mask_single_word() {
        let set = HexMask.parse("00000011\n").unwrap();
        assert_eq!(ids(&set), vec![0, 4]);
    }

    #[test]
    fn test_hex_mask_multi_word() {
        // cpu 1 and cpu 33
        let set = HexMask.parse("00000002,00000002").unwrap();
        assert_eq!(ids(&set), vec![1, 33]);
    }

    #[test]
    fn test_both_formats_decode_to_same_set() {
        let from_list = RangeList.parse("0,4,8-12").unwrap();
        let from_mask = HexMask.parse("00001f11").unwrap();
        assert_eq!(from_list, from_mask);
    }

    #[test]
    fn test_hex_mask_rejects_long_word() {
        assert!(HexMask.parse("123456789").is_none());
        assert!(HexMask.parse("").is_none());
    }

    #[test]
    fn test_count_below() {
        let set = RangeList.parse("2,6,10,14").unwrap();
        assert_eq!(set.count_below(CpuId(2)), 0);
        assert_eq!(set.count_below(CpuId(10)), 2);
        assert_eq!(set.count_below(CpuId(15)), 4);
    }

    #[test]
    fn test_sibling_sources_prefer_list() {
        assert_eq!(SIBLING_SOURCES[0].file, "thread_siblings_list");
        assert_eq!(SIBLING_SOURCES[0].format.name(), "range list");
    }
}
