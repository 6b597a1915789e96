use serde::{Deserialize, Serialize};

/// Stroke count sentinel for radicals without stroke data / 无笔画数据的哨兵值
///
/// `0` would be indistinguishable from a genuine zero-stroke entry; consumers
/// filter with `stroke_count >= 0`.
pub const STROKE_COUNT_UNKNOWN: i64 = -1;

/// Separator used for the comma-joined list columns / 列表列的分隔符
pub const LIST_SEPARATOR: &str = ",";

/// Row of the kanji_radical_mapping table / 汉字部首构成表的行
///
/// `components` is comma-joined in source order, duplicates preserved.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KanjiRadicalRow {
    pub kanji: String,
    pub components: String,
}

/// Row of the radical_kanji_mapping table / 部首汉字倒排表的行
///
/// `kanji_list` is sorted and comma-joined so that two builds over identical
/// snapshots produce byte-identical rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RadicalKanjiRow {
    pub radical: String,
    pub stroke_count: i64,
    pub kanji_list: String,
}

/// Row of the radical_decomposition_mapping table / 部首分解表的行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RadicalDecompositionRow {
    pub radical: String,
    pub components: String,
    /// Denormalized count of `components` for cheap filtering / 组件数量（冗余列）
    pub component_count: i64,
}

/// Summary of one full index build / 一次完整索引构建的摘要
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Kanji with at least one radical / 至少有一个部首的汉字数
    pub kanji_count: usize,
    /// Radicals in the canonical vocabulary / 规范部首表中的部首数
    pub radical_count: usize,
    /// Stored decomposition edges / 已存储的分解边数
    pub decomposition_count: usize,
    /// Malformed snapshot records skipped during loading / 加载时跳过的损坏记录数
    pub skipped_records: usize,
}
