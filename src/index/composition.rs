//! Composition index builder - inverts kanji→radicals into radicals→kanji / 部首倒排索引构建
//!
//! The inverse index covers *direct* membership only; hierarchical matching
//! through composite radicals is resolved at query time by the engine, so
//! this table stays stable across decomposition data changes.
//!
//! The radical set of the finished index is the canonical radical vocabulary
//! consumed by the decomposition builder / 完成后的部首集合即规范部首表.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::STROKE_COUNT_UNKNOWN;

use super::source::{KradSnapshot, RadkSnapshot};

/// One radical's inverse index entry / 单个部首的倒排条目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadicalEntry {
    /// Stroke count, `STROKE_COUNT_UNKNOWN` when the secondary snapshot has
    /// no data for this radical / 笔画数
    pub stroke_count: i64,
    /// Kanji directly composed of this radical, sorted / 直接包含该部首的汉字
    pub kanji: BTreeSet<String>,
}

/// Inverse composition index / 部首倒排索引
///
/// Ordered map so that iteration (and therefore persistence) is
/// deterministic across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InverseIndex {
    pub entries: BTreeMap<String, RadicalEntry>,
}

impl InverseIndex {
    /// Whether the radical is part of the canonical vocabulary / 是否属于规范部首表
    pub fn contains(&self, radical: &str) -> bool {
        self.entries.contains_key(radical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the inverse composition index / 构建部首倒排索引
///
/// Radicals that only appear in the stroke-count snapshot still get an entry
/// with an empty kanji bucket: the vocabulary must be complete even where the
/// composition data is not.
pub fn build_inverse_index(krad: &KradSnapshot, radk: &RadkSnapshot) -> InverseIndex {
    let mut index = InverseIndex::default();

    // 先用笔画快照铺底（含无汉字的部首）
    for (radical, entry) in &radk.radicals {
        index.entries.insert(
            radical.clone(),
            RadicalEntry {
                stroke_count: entry.stroke_count.unwrap_or(STROKE_COUNT_UNKNOWN),
                kanji: BTreeSet::new(),
            },
        );
    }

    // 倒排：每个汉字加入其各部首的桶
    for (kanji, radicals) in &krad.kanji {
        for radical in radicals {
            index
                .entries
                .entry(radical.clone())
                .or_insert_with(|| RadicalEntry {
                    stroke_count: STROKE_COUNT_UNKNOWN,
                    kanji: BTreeSet::new(),
                })
                .kanji
                .insert(kanji.clone());
        }
    }

    if index.is_empty() {
        tracing::warn!("Inverse index is empty: no composition or stroke data loaded");
    } else {
        tracing::info!(
            "Inverse index built: {} radicals from {} kanji",
            index.len(),
            krad.kanji.len()
        );
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::source::RadkEntry;

    fn krad(pairs: Vec<(&str, Vec<&str>)>) -> KradSnapshot {
        KradSnapshot {
            kanji: pairs
                .into_iter()
                .map(|(k, rs)| (k.to_string(), rs.into_iter().map(String::from).collect()))
                .collect(),
        }
    }

    fn radk(pairs: Vec<(&str, Option<i64>)>) -> RadkSnapshot {
        RadkSnapshot {
            radicals: pairs
                .into_iter()
                .map(|(r, s)| (r.to_string(), RadkEntry { stroke_count: s }))
                .collect(),
        }
    }

    #[test]
    fn test_inversion() {
        let index = build_inverse_index(
            &krad(vec![
                ("肉", vec!["冂", "人"]),
                ("内", vec!["冂", "人"]),
                ("一", vec!["一"]),
            ]),
            &radk(vec![]),
        );

        let bucket = &index.entries["冂"].kanji;
        assert!(bucket.contains("肉"));
        assert!(bucket.contains("内"));
        assert_eq!(index.entries["一"].kanji.len(), 1);
    }

    #[test]
    fn test_duplicate_radicals_in_one_kanji() {
        // 肉 lists 人 twice; the bucket is a set / 同一汉字内重复部首
        let index = build_inverse_index(&krad(vec![("肉", vec!["冂", "人", "人"])]), &radk(vec![]));
        assert_eq!(index.entries["人"].kanji.len(), 1);
    }

    #[test]
    fn test_stroke_count_enrichment_and_sentinel() {
        let index = build_inverse_index(
            &krad(vec![("肉", vec!["冂", "人"])]),
            &radk(vec![("冂", Some(2)), ("一", Some(1))]),
        );

        assert_eq!(index.entries["冂"].stroke_count, 2);
        // 人 has no stroke data → sentinel, not zero
        assert_eq!(index.entries["人"].stroke_count, STROKE_COUNT_UNKNOWN);
    }

    #[test]
    fn test_radical_without_composition_keeps_empty_bucket() {
        let index = build_inverse_index(&krad(vec![]), &radk(vec![("龠", Some(17))]));

        assert!(index.contains("龠"));
        assert!(index.entries["龠"].kanji.is_empty());
    }

    #[test]
    fn test_empty_sources_give_empty_index() {
        let index = build_inverse_index(&KradSnapshot::default(), &RadkSnapshot::default());
        assert!(index.is_empty());
    }
}
