use sqlx::sqlite::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanjidex_backend::config;
use kanjidex_backend::db;
use kanjidex_backend::index::{self, DecompositionBuilder};
use kanjidex_backend::models::BuildReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanjidex_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "kanjidex-backend {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    // Load configuration / 加载配置
    let app_config = config::load_config().expect("Failed to load configuration");

    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| app_config.get_database_url());

    let pool: SqlitePool = db::connect(&database_url).await?;
    db::run_migrations(&pool).await?;

    // 1. Composition snapshot defines the radical vocabulary / 构成快照决定部首表
    let krad = index::source::load_kradfile(&app_config.get_kradfile_path());
    if krad.kanji.is_empty() {
        // Without compositions the vocabulary is empty and every later stage
        // is vacuous; this is the one build-level failure.
        anyhow::bail!(
            "composition snapshot missing or empty: {:?}",
            app_config.get_kradfile_path()
        );
    }

    let radk = index::source::load_radkfile(&app_config.get_radkfile_path());
    let decomposition_source =
        index::source::load_decomposition(&app_config.get_decomposition_path());

    // 2. Build: inversion, then graph flattening (strictly sequential) / 顺序构建
    let inverse = index::build_inverse_index(&krad, &radk);
    let decomposition = DecompositionBuilder::new(&inverse, &decomposition_source).build();

    // 3. Persist / 持久化
    index::store::persist_index(&pool, &krad.kanji, &inverse, &decomposition).await?;

    let report = BuildReport {
        kanji_count: krad.kanji.len(),
        radical_count: inverse.len(),
        decomposition_count: decomposition.len(),
        skipped_records: decomposition_source.skipped,
    };
    index::store::save_build_report(&pool, &report).await?;

    tracing::info!(
        "Index build finished: {} kanji, {} radicals, {} decomposition edges ({} records skipped)",
        report.kanji_count,
        report.radical_count,
        report.decomposition_count,
        report.skipped_records
    );

    Ok(())
}
