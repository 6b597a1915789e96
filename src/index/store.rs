//! Index persistence - writes the built relations to the dictionary database / 索引持久化
//!
//! Storage layout (consumed by the dictionary frontend) / 存储布局：
//! - kanji_radical_mapping: components comma-joined in source order
//! - radical_kanji_mapping: kanji_list sorted + comma-joined for deterministic
//!   diffing between builds / 排序后连接，保证两次构建逐字节一致
//! - radical_decomposition_mapping: flat edges + denormalized component_count
//!
//! A rebuild replaces all rows inside one transaction; readers of the
//! database never observe a half-written index.

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::models::{
    BuildReport, KanjiRadicalRow, RadicalDecompositionRow, RadicalKanjiRow, LIST_SEPARATOR,
};

use super::composition::{InverseIndex, RadicalEntry};
use super::engine::IndexSnapshot;

/// Persist the three built relations / 持久化三个关系
///
/// Full recompute semantics: previous rows are deleted first, all inside one
/// transaction.
pub async fn persist_index(
    pool: &SqlitePool,
    composition: &BTreeMap<String, Vec<String>>,
    inverse: &InverseIndex,
    decomposition: &BTreeMap<String, Vec<String>>,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    // 全量重建：先清空旧数据
    sqlx::query("DELETE FROM kanji_radical_mapping")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM radical_kanji_mapping")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM radical_decomposition_mapping")
        .execute(&mut *tx)
        .await?;

    for (kanji, components) in composition {
        sqlx::query("INSERT INTO kanji_radical_mapping (kanji, components) VALUES (?, ?)")
            .bind(kanji)
            .bind(components.join(LIST_SEPARATOR))
            .execute(&mut *tx)
            .await?;
    }

    for (radical, entry) in &inverse.entries {
        // BTreeSet iteration is already sorted / 集合迭代天然有序
        let kanji_list = entry
            .kanji
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        sqlx::query(
            "INSERT INTO radical_kanji_mapping (radical, stroke_count, kanji_list) VALUES (?, ?, ?)",
        )
        .bind(radical)
        .bind(entry.stroke_count)
        .bind(kanji_list)
        .execute(&mut *tx)
        .await?;
    }

    for (radical, components) in decomposition {
        sqlx::query(
            "INSERT INTO radical_decomposition_mapping (radical, components, component_count) \
             VALUES (?, ?, ?)",
        )
        .bind(radical)
        .bind(components.join(LIST_SEPARATOR))
        .bind(components.len() as i64)
        .execute(&mut *tx)
        .await?;
    }

    let now = chrono::Utc::now().timestamp();
    sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES ('built_at', ?)")
        .bind(now.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Index persisted: {} kanji, {} radicals, {} decomposition edges",
        composition.len(),
        inverse.len(),
        decomposition.len()
    );
    Ok(())
}

/// Record the build report in the metadata table / 记录构建摘要
pub async fn save_build_report(pool: &SqlitePool, report: &BuildReport) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES ('build_report', ?)")
        .bind(serde_json::to_string(report)?)
        .execute(pool)
        .await?;
    Ok(())
}

/// Get index build time / 获取索引构建时间
pub async fn get_built_at(pool: &SqlitePool) -> Option<i64> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM index_meta WHERE key = 'built_at'")
            .fetch_optional(pool)
            .await
            .ok()
            .flatten();

    result.and_then(|(v,)| v.parse::<i64>().ok())
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(LIST_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Load a query snapshot from the database / 从数据库加载查询快照
///
/// Inverse of `persist_index`; the returned snapshot carries version 0 until
/// installed into a `SharedIndex`.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<IndexSnapshot> {
    let composition_rows: Vec<KanjiRadicalRow> =
        sqlx::query_as("SELECT kanji, components FROM kanji_radical_mapping")
            .fetch_all(pool)
            .await?;

    let mut composition = BTreeMap::new();
    for row in composition_rows {
        composition.insert(row.kanji, split_list(&row.components));
    }

    let inverse_rows: Vec<RadicalKanjiRow> =
        sqlx::query_as("SELECT radical, stroke_count, kanji_list FROM radical_kanji_mapping")
            .fetch_all(pool)
            .await?;

    let mut inverse = InverseIndex::default();
    for row in inverse_rows {
        inverse.entries.insert(
            row.radical,
            RadicalEntry {
                stroke_count: row.stroke_count,
                kanji: split_list(&row.kanji_list).into_iter().collect(),
            },
        );
    }

    let decomposition_rows: Vec<RadicalDecompositionRow> = sqlx::query_as(
        "SELECT radical, components, component_count FROM radical_decomposition_mapping",
    )
    .fetch_all(pool)
    .await?;

    let mut decomposition = BTreeMap::new();
    for row in decomposition_rows {
        decomposition.insert(row.radical, split_list(&row.components));
    }

    Ok(IndexSnapshot::from_parts(composition, inverse, decomposition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::index::composition::build_inverse_index;
    use crate::index::decomposition::DecompositionBuilder;
    use crate::index::source::{DecompositionSource, KradSnapshot, RadkEntry, RadkSnapshot};
    use crate::models::STROKE_COUNT_UNKNOWN;

    struct Fixture {
        composition: BTreeMap<String, Vec<String>>,
        inverse: InverseIndex,
        decomposition: BTreeMap<String, Vec<String>>,
    }

    fn fixture() -> Fixture {
        let krad = KradSnapshot {
            kanji: [("肉", vec!["冂", "人", "人"]), ("内", vec!["冂", "人"])]
                .into_iter()
                .map(|(k, rs)| (k.to_string(), rs.into_iter().map(String::from).collect()))
                .collect(),
        };
        let radk = RadkSnapshot {
            radicals: [("｜", Some(1)), ("冂", Some(2)), ("人", None), ("肉", Some(6))]
                .into_iter()
                .map(|(r, s)| (r.to_string(), RadkEntry { stroke_count: s }))
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

        Fixture {
            composition: krad.kanji,
            inverse,
            decomposition,
        }
    }

    async fn test_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let db_path = dir.path().join("kanjidex.db");
        let url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());
        let pool = db::connect(&url).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let fx = fixture();

        persist_index(&pool, &fx.composition, &fx.inverse, &fx.decomposition)
            .await
            .unwrap();

        let snapshot = load_snapshot(&pool).await.unwrap();
        assert_eq!(snapshot.kanji_count(), 2);
        assert_eq!(snapshot.radical_count(), 4);
        assert_eq!(snapshot.decomposition_count(), 2);

        // 查询行为经数据库往返后不变
        assert!(snapshot.query(["｜", "人"]).contains("肉"));
        assert_eq!(snapshot.components_of("肉").unwrap(), ["冂", "人", "人"]);
        assert_eq!(snapshot.stroke_count("人"), Some(STROKE_COUNT_UNKNOWN));
        assert_eq!(snapshot.stroke_count("冂"), Some(2));
    }

    #[tokio::test]
    async fn test_kanji_list_is_sorted_and_counts_match() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let fx = fixture();

        persist_index(&pool, &fx.composition, &fx.inverse, &fx.decomposition)
            .await
            .unwrap();

        let row: RadicalKanjiRow = sqlx::query_as(
            "SELECT radical, stroke_count, kanji_list FROM radical_kanji_mapping WHERE radical = '冂'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let mut sorted = split_list(&row.kanji_list);
        sorted.sort();
        assert_eq!(split_list(&row.kanji_list), sorted);

        let decomp_row: RadicalDecompositionRow = sqlx::query_as(
            "SELECT radical, components, component_count FROM radical_decomposition_mapping \
             WHERE radical = '肉'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(decomp_row.component_count, 3);
        assert_eq!(split_list(&decomp_row.components).len(), 3);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_rows() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let fx = fixture();

        persist_index(&pool, &fx.composition, &fx.inverse, &fx.decomposition)
            .await
            .unwrap();
        // 第二次构建覆盖而不是追加
        persist_index(&pool, &fx.composition, &fx.inverse, &fx.decomposition)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kanji_radical_mapping")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);

        assert!(get_built_at(&pool).await.is_some());
    }

    #[tokio::test]
    async fn test_empty_index_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;

        persist_index(&pool, &BTreeMap::new(), &InverseIndex::default(), &BTreeMap::new())
            .await
            .unwrap();

        let snapshot = load_snapshot(&pool).await.unwrap();
        assert_eq!(snapshot.kanji_count(), 0);
        assert!(snapshot.query(["人"]).is_empty());
    }
}
