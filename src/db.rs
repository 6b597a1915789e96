use anyhow::Result;
use sqlx::SqlitePool;

/// Connect to the dictionary database and apply pragmas / 连接词典数据库并设置 PRAGMA
///
/// WAL mode keeps the database readable while a rebuild transaction is in
/// flight; busy_timeout covers the window where a previous build still holds
/// the write lock.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePool::connect(database_url).await?;

    // 启用WAL模式，提高并发性能
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    // 设置busy_timeout，避免锁超时
    sqlx::query("PRAGMA busy_timeout=10000").execute(&pool).await?;

    // 优化写入性能
    sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

    Ok(pool)
}

/// Run database migrations / 运行数据库迁移
///
/// Creates the three radical index tables consumed by the dictionary frontend
/// plus the build metadata table. Only creates missing tables; a rebuild
/// replaces row contents, not the schema.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // 汉字 → 部首构成（kradfile 的原始关系）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kanji_radical_mapping (
            kanji TEXT PRIMARY KEY,
            components TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 部首 → 汉字倒排表（含笔画数）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radical_kanji_mapping (
            radical TEXT PRIMARY KEY,
            stroke_count INTEGER NOT NULL DEFAULT -1,
            kanji_list TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 复合部首 → 基础部首（扁平化一跳分解边）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radical_decomposition_mapping (
            radical TEXT PRIMARY KEY,
            components TEXT NOT NULL,
            component_count INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_decomposition_count \
         ON radical_decomposition_mapping(component_count)",
    )
    .execute(pool)
    .await?;

    // 构建元数据表 / Build metadata table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS index_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
