//! Hierarchical expansion and query engine / 层级展开与查询引擎
//!
//! Answers "which kanji contain all of these radicals" with AND semantics.
//! A selected radical matches directly or through any composite radical whose
//! stored decomposition contains it; because stored edges are already flat,
//! one expansion pass covers arbitrarily deep source hierarchies.
//!
//! Snapshot model / 快照模型：
//! - `IndexSnapshot` is immutable after construction; queries are pure reads
//!   and need no locking / 构建后不可变，查询无需加锁
//! - `SharedIndex` swaps fully-built snapshots atomically; readers see either
//!   the previous or the next complete index, never a partial one / 原子替换

use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::composition::InverseIndex;

/// Immutable radical index snapshot / 不可变部首索引快照
pub struct IndexSnapshot {
    version: u64,
    /// kanji → direct radical components (source order) / 汉字→直接部首构成
    composition: BTreeMap<String, Vec<String>>,
    /// radical → stroke count + direct kanji bucket / 部首倒排索引
    inverse: InverseIndex,
    /// composite radical → flat base components / 复合部首→基础部首
    decomposition: BTreeMap<String, Vec<String>>,
    /// Reverse edge map: component → composites containing it / 反向边表
    containing: HashMap<String, BTreeSet<String>>,
}

impl IndexSnapshot {
    /// Empty snapshot (version 0) / 空快照
    pub fn empty() -> Self {
        Self::from_parts(BTreeMap::new(), InverseIndex::default(), BTreeMap::new())
    }

    /// Assemble a snapshot from the three built relations / 由三个关系组装快照
    pub fn from_parts(
        composition: BTreeMap<String, Vec<String>>,
        inverse: InverseIndex,
        decomposition: BTreeMap<String, Vec<String>>,
    ) -> Self {
        // 构建反向边表：部件 → 包含它的复合部首
        let mut containing: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (composite, components) in &decomposition {
            for component in components {
                containing
                    .entry(component.clone())
                    .or_default()
                    .insert(composite.clone());
            }
        }

        Self {
            version: 0,
            composition,
            inverse,
            decomposition,
            containing,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn kanji_count(&self) -> usize {
        self.composition.len()
    }

    pub fn radical_count(&self) -> usize {
        self.inverse.len()
    }

    pub fn decomposition_count(&self) -> usize {
        self.decomposition.len()
    }

    /// Direct radical components of a kanji / 汉字的直接部首构成
    pub fn components_of(&self, kanji: &str) -> Option<&[String]> {
        self.composition.get(kanji).map(|c| c.as_slice())
    }

    /// Stroke count of a radical, if the vocabulary knows it / 部首笔画数
    pub fn stroke_count(&self, radical: &str) -> Option<i64> {
        self.inverse.entries.get(radical).map(|e| e.stroke_count)
    }

    /// Expand one selected radical / 展开单个选中部首
    ///
    /// The radical itself plus every composite radical whose stored
    /// decomposition lists it as a component.
    pub fn expand(&self, radical: &str) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();
        expanded.insert(radical.to_string());
        if let Some(composites) = self.containing.get(radical) {
            expanded.extend(composites.iter().cloned());
        }
        expanded
    }

    /// All kanji satisfying one selected radical / 满足单个部首的全部汉字
    ///
    /// Union of the inverse-index buckets over the expansion. A radical
    /// unknown to both indexes yields the empty set.
    pub fn satisfied(&self, radical: &str) -> BTreeSet<String> {
        let mut kanji = BTreeSet::new();
        for expanded in self.expand(radical) {
            if let Some(entry) = self.inverse.entries.get(&expanded) {
                kanji.extend(entry.kanji.iter().cloned());
            }
        }
        kanji
    }

    /// AND query over a radical selection / 部首多选查询
    ///
    /// Returns the kanji containing every selected radical, directly or
    /// through a composite radical. The selection is treated as a set, so
    /// duplicates do not change the result; an unknown radical makes the
    /// query unsatisfiable; the empty selection returns the empty set.
    pub fn query<I>(&self, radicals: I) -> BTreeSet<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let selection: BTreeSet<String> = radicals
            .into_iter()
            .map(|r| r.as_ref().to_string())
            .collect();

        let mut result: Option<BTreeSet<String>> = None;
        for radical in &selection {
            let satisfied = self.satisfied(radical);
            let merged = match result {
                None => satisfied,
                Some(acc) => acc.intersection(&satisfied).cloned().collect(),
            };
            if merged.is_empty() {
                return BTreeSet::new();
            }
            result = Some(merged);
        }

        result.unwrap_or_default()
    }
}

/// Shared handle over the active index snapshot / 活动索引快照的共享句柄
///
/// Readers clone the `Arc` once and query lock-free; a rebuild installs the
/// next complete snapshot in one swap.
pub struct SharedIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl SharedIndex {
    /// Start with an empty snapshot at version 0 / 以空快照启动
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::empty())),
        }
    }

    /// Get the active snapshot / 获取当前快照
    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    /// Install a fully-built snapshot, returning its version / 安装新快照
    pub fn install(&self, mut snapshot: IndexSnapshot) -> u64 {
        let mut guard = self.current.write();
        snapshot.version = guard.version + 1;
        let version = snapshot.version;
        *guard = Arc::new(snapshot);
        tracing::info!("Index snapshot v{} installed", version);
        version
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::composition::build_inverse_index;
    use crate::index::decomposition::DecompositionBuilder;
    use crate::index::source::{DecompositionSource, KradSnapshot, RadkEntry, RadkSnapshot};

    /// Scenario fixture: 肉 = 冂 + 人 + 人, 冂 decomposes to ｜ / 场景数据
    fn scenario_snapshot() -> IndexSnapshot {
        let krad = KradSnapshot {
            kanji: [
                ("肉", vec!["冂", "人", "人"]),
                ("内", vec!["冂", "人"]),
                ("仁", vec!["⺅", "二"]),
                ("口", vec!["口"]),
                ("呂", vec!["口"]),
            ]
            .into_iter()
            .map(|(k, rs)| (k.to_string(), rs.into_iter().map(String::from).collect()))
            .collect(),
        };
        let radk = RadkSnapshot {
            radicals: ["｜", "人", "冂", "肉", "⺅", "二", "口"]
                .into_iter()
                .map(|r| (r.to_string(), RadkEntry { stroke_count: Some(1) }))
                .collect(),
        };
        let inverse = build_inverse_index(&krad, &radk);

        let source = DecompositionSource {
            entries: [("冂", "⿰丨𠃌"), ("肉", "⿵内？")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            skipped: 0,
        };
        let decomposition = DecompositionBuilder::new(&inverse, &source).build();

        IndexSnapshot::from_parts(krad.kanji, inverse, decomposition)
    }

    #[test]
    fn test_expand_is_reflexive() {
        let snapshot = scenario_snapshot();
        for radical in snapshot.inverse.entries.keys() {
            assert!(snapshot.expand(radical).contains(radical));
        }
    }

    #[test]
    fn test_inversion_round_trip() {
        let snapshot = scenario_snapshot();
        for (kanji, components) in &snapshot.composition {
            for radical in components {
                assert!(
                    snapshot.satisfied(radical).contains(kanji),
                    "{} should satisfy {}",
                    kanji,
                    radical
                );
            }
        }
    }

    #[test]
    fn test_nested_radical_search_finds_meat() {
        // ｜ only occurs inside 冂, which itself is nested in 肉
        let snapshot = scenario_snapshot();

        let expanded = snapshot.expand("｜");
        assert!(expanded.contains("冂"));

        let result = snapshot.query(["｜", "人"]);
        assert!(result.contains("肉"));
        assert!(result.contains("内"));
    }

    #[test]
    fn test_plain_radical_equals_inverse_bucket() {
        // 口 is never referenced by a composite and has no decomposition
        let snapshot = scenario_snapshot();
        let bucket = &snapshot.inverse.entries["口"].kanji;
        assert_eq!(&snapshot.query(["口"]), bucket);
    }

    #[test]
    fn test_unknown_radical_yields_empty_result() {
        let snapshot = scenario_snapshot();
        assert!(snapshot.query(["龍"]).is_empty());
        // 与已知部首相交依然为空
        assert!(snapshot.query(["人", "龍"]).is_empty());
    }

    #[test]
    fn test_duplicate_selection_is_idempotent() {
        let snapshot = scenario_snapshot();
        assert_eq!(snapshot.query(["人", "人"]), snapshot.query(["人"]));
    }

    #[test]
    fn test_empty_selection_returns_empty() {
        let snapshot = scenario_snapshot();
        assert!(snapshot.query(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_adding_edge_only_grows_expansion() {
        let snapshot = scenario_snapshot();
        let before = snapshot.expand("人");

        let mut decomposition = snapshot.decomposition.clone();
        decomposition.insert("⺅".to_string(), vec!["人".to_string()]);
        let grown = IndexSnapshot::from_parts(
            snapshot.composition.clone(),
            snapshot.inverse.clone(),
            decomposition,
        );

        let after = grown.expand("人");
        assert!(after.is_superset(&before));
        assert!(after.contains("⺅"));
    }

    #[test]
    fn test_shared_index_swap() {
        let shared = SharedIndex::new();
        assert_eq!(shared.current().version(), 0);
        assert_eq!(shared.current().kanji_count(), 0);

        let old = shared.current();
        let version = shared.install(scenario_snapshot());
        assert_eq!(version, 1);

        // 旧快照句柄不受替换影响
        assert_eq!(old.version(), 0);
        assert!(old.query(["人"]).is_empty());
        assert!(shared.current().query(["人"]).contains("肉"));
    }
}
