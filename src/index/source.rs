//! Snapshot loaders - immutable dictionary source files / 快照加载
//!
//! Three snapshot files feed the index build / 三个快照文件：
//! - kradfile.json: kanji → ordered radical list / 汉字→部首构成
//! - radkfile.json: radical → stroke count / 部首→笔画数
//! - decomposition.jsonl: character → decomposition string, one JSON object
//!   per line / 字形分解（每行一条 JSON 记录）
//!
//! Degradation semantics / 降级语义：
//! - Missing or unreadable file → empty snapshot, build continues / 文件缺失则返回空快照
//! - Malformed JSONL line → skipped and counted / 损坏行跳过并计数

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Kanji → radicals snapshot / 汉字→部首快照
///
/// File shape: `{"kanji": {"亜": ["一", "｜", "口"], ...}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KradSnapshot {
    #[serde(default)]
    pub kanji: BTreeMap<String, Vec<String>>,
}

/// Radical → stroke count snapshot / 部首→笔画数快照
///
/// File shape: `{"radicals": {"一": {"strokeCount": 1, ...}, ...}}`;
/// fields other than the stroke count are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadkSnapshot {
    #[serde(default)]
    pub radicals: BTreeMap<String, RadkEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadkEntry {
    #[serde(rename = "strokeCount")]
    pub stroke_count: Option<i64>,
}

/// One line of the decomposition snapshot / 字形分解快照的一行
#[derive(Debug, Clone, Deserialize)]
struct DecompositionRecord {
    character: String,
    #[serde(default)]
    decomposition: String,
}

/// Raw character decomposition source / 原始字形分解数据
///
/// The decomposition strings still carry ideographic description markers and
/// foreign-script component forms; normalization happens in the decomposition
/// builder, not here.
#[derive(Debug, Clone, Default)]
pub struct DecompositionSource {
    /// character → marker-laden decomposition string / 字符→带标记的分解串
    pub entries: BTreeMap<String, String>,
    /// Malformed lines skipped during loading / 加载时跳过的损坏行数
    pub skipped: usize,
}

/// Load the kanji → radicals snapshot / 加载 kradfile 快照
pub fn load_kradfile(path: &Path) -> KradSnapshot {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<KradSnapshot>(&content) {
            Ok(snapshot) => {
                tracing::info!("Loaded {} kanji compositions from {:?}", snapshot.kanji.len(), path);
                snapshot
            }
            Err(e) => {
                tracing::warn!("Failed to parse kradfile {:?}: {}", path, e);
                KradSnapshot::default()
            }
        },
        Err(e) => {
            tracing::warn!("Kradfile snapshot not readable at {:?}: {}", path, e);
            KradSnapshot::default()
        }
    }
}

/// Load the radical → stroke count snapshot / 加载 radkfile 快照
pub fn load_radkfile(path: &Path) -> RadkSnapshot {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<RadkSnapshot>(&content) {
            Ok(snapshot) => {
                tracing::info!("Loaded {} radicals from {:?}", snapshot.radicals.len(), path);
                snapshot
            }
            Err(e) => {
                tracing::warn!("Failed to parse radkfile {:?}: {}", path, e);
                RadkSnapshot::default()
            }
        },
        Err(e) => {
            tracing::warn!("Radkfile snapshot not readable at {:?}: {}", path, e);
            RadkSnapshot::default()
        }
    }
}

/// Load the character decomposition snapshot / 加载字形分解快照
///
/// Reads line by line; a line that fails to parse is skipped individually so
/// one corrupt record never aborts the build. The first record wins when a
/// character appears twice.
pub fn load_decomposition(path: &Path) -> DecompositionSource {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Decomposition snapshot not readable at {:?}: {}", path, e);
            return DecompositionSource::default();
        }
    };

    let mut source = DecompositionSource::default();
    let reader = BufReader::new(file);

    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(_) => {
                source.skipped += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DecompositionRecord>(&line) {
            Ok(record) => {
                source
                    .entries
                    .entry(record.character)
                    .or_insert(record.decomposition);
            }
            Err(e) => {
                tracing::debug!("Skipping malformed decomposition line {}: {}", line_no + 1, e);
                source.skipped += 1;
            }
        }
    }

    tracing::info!(
        "Loaded {} decomposition entries from {:?} ({} lines skipped)",
        source.entries.len(),
        path,
        source.skipped
    );
    source
}
