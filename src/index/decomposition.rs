//! Decomposition graph builder - flattens the Chinese decomposition source
//! against the Japanese radical vocabulary / 部首分解图构建
//!
//! The decomposition snapshot follows Chinese glyph conventions; the radical
//! vocabulary follows Japanese ones. Resolution order per component / 解析优先级：
//! 1. Manual correction table (whole-radical override) / 人工修正表
//! 2. Glyph substitution table / 字形替换表
//! 3. Vocabulary membership / 部首表成员
//! 4. Recursive expansion through the source itself / 递归展开
//! 5. Drop / 丢弃
//!
//! The output edge set is flat: one hop from composite radical to canonical
//! base radicals, so query-time expansion never walks the graph.

use std::collections::BTreeMap;

use super::composition::InverseIndex;
use super::source::DecompositionSource;

/// Ideographic description characters, U+2FF0..=U+2FFF / 表意文字描述符
///
/// Structural markers in decomposition strings; stripped, never stored.
fn is_ideographic_description(c: char) -> bool {
    ('\u{2FF0}'..='\u{2FFF}').contains(&c)
}

/// Strip structural markers from a raw decomposition string / 剥离结构标记
///
/// `"⿻亅八"` → `["亅", "八"]`; component order is preserved.
pub fn parse_decomposition(raw: &str) -> Vec<String> {
    raw.chars()
        .filter(|c| !is_ideographic_description(*c) && !c.is_whitespace())
        .map(|c| c.to_string())
        .collect()
}

/// Chinese → Japanese component substitution / 中文→日文部件替换表
///
/// Pure glyph→glyph data applied before any graph resolution, in the same
/// shape as a simplified/traditional conversion table.
pub fn substitute(component: &str) -> Option<&'static str> {
    Some(match component {
        // 笔画 / strokes
        "丨" => "｜",
        "丿" => "ノ",
        // 偏旁变体 / positional radical forms
        "灬" => "⺣",
        "亻" => "⺅",
        "氵" => "⺡",
        "忄" => "⺖",
        "犭" => "⺨",
        "刂" => "⺉",
        "艹" => "⺾",
        "辶" => "⻌",
        "阝" => "⻏",
        "礻" => "⺭",
        "衤" => "⻂",
        "罒" => "⺲",
        "耂" => "⺹",
        "疒" => "⽧",
        "𤣩" => "王",
        "飠" => "食",
        "釒" => "金",
        "訁" => "言",
        "糹" => "糸",
        _ => return None,
    })
}

/// Manual correction table / 人工修正表
///
/// Overrides for composite radicals whose source decomposition is wrong or
/// corrupted; an entry here is never reprocessed generically.
fn manual_correction(radical: &str) -> Option<&'static [&'static str]> {
    match radical {
        // Source gives ⿻亅八; the radical is two dots
        "丷" => Some(&["丶", "丶"]),
        // Source nests 内 and carries the corrupted ？ placeholder
        "肉" => Some(&["冂", "人", "人"]),
        _ => None,
    }
}

/// Component whose source entry decomposes into itself / 自引用部件
///
/// Expanded to a fixed terminal pair instead of recursing.
const SELF_REFERENTIAL: &str = "龰";
const SELF_REFERENTIAL_EXPANSION: [&str; 2] = ["卜", "人"];

/// Radicals allowed to keep a single-component decomposition / 允许单部件分解的部首
///
/// Their only canonical component is still a useful hierarchy link
/// (e.g. 冂 → ｜); everything else needs at least two.
fn allows_single_component(radical: &str) -> bool {
    matches!(radical, "冂" | "凵")
}

/// Decomposition graph builder / 部首分解图构建器
///
/// Borrows the finished inverse index (the canonical vocabulary) and the raw
/// decomposition source; produces the flat edge set.
pub struct DecompositionBuilder<'a> {
    vocabulary: &'a InverseIndex,
    source: &'a DecompositionSource,
}

impl<'a> DecompositionBuilder<'a> {
    pub fn new(vocabulary: &'a InverseIndex, source: &'a DecompositionSource) -> Self {
        Self { vocabulary, source }
    }

    /// Build the flat decomposition edge set / 构建扁平分解边集
    ///
    /// Deterministic: candidates are visited in key order and component order
    /// follows the source string, so identical snapshots yield identical
    /// edge sets.
    pub fn build(&self) -> BTreeMap<String, Vec<String>> {
        let mut edges = BTreeMap::new();

        for (radical, raw) in &self.source.entries {
            // 只处理规范部首表内的复合部首
            if !self.vocabulary.contains(radical) {
                continue;
            }

            let components = match manual_correction(radical) {
                Some(fixed) => fixed.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                None => {
                    let mut resolved = Vec::new();
                    let mut path = Vec::new();
                    for part in parse_decomposition(raw) {
                        self.resolve_into(&part, &mut path, &mut resolved);
                    }
                    resolved
                }
            };

            let min_components = if allows_single_component(radical) { 1 } else { 2 };
            if components.len() >= min_components {
                edges.insert(radical.clone(), components);
            }
        }

        tracing::info!(
            "Decomposition graph built: {} edges from {} source entries",
            edges.len(),
            self.source.entries.len()
        );
        edges
    }

    /// Resolve one component into canonical base radicals / 解析单个部件
    ///
    /// `path` holds the source keys currently being expanded; re-entering one
    /// of them ends that branch instead of recursing forever.
    fn resolve_into(&self, component: &str, path: &mut Vec<String>, out: &mut Vec<String>) {
        let component = substitute(component).unwrap_or(component);

        if self.vocabulary.contains(component) {
            out.push(component.to_string());
            return;
        }

        if component == SELF_REFERENTIAL {
            // 源数据中该部件分解为自身
            for base in SELF_REFERENTIAL_EXPANSION {
                if self.vocabulary.contains(base) {
                    out.push(base.to_string());
                }
            }
            return;
        }

        if path.iter().any(|p| p == component) {
            return;
        }

        if let Some(raw) = self.source.entries.get(component) {
            path.push(component.to_string());
            for part in parse_decomposition(raw) {
                self.resolve_into(&part, path, out);
            }
            path.pop();
        }
        // 既不在部首表也不在源数据中的部件被丢弃
    }
}
