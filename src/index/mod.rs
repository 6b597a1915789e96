//! Radical index module - builds and queries the radical composition index / 部首索引模块
//!
//! Architecture principles / 架构原则：
//! - Builders only expose primitive operations: load snapshots, invert, resolve, persist
//! - The binary controls build order, progress and error surfacing
//! - Call direction: orchestration → index (unidirectional) / 调用方向
//!
//! Build pipeline (strictly sequential) / 构建流水线：
//! 1. `composition` inverts the kanji→radical snapshot and fixes the radical vocabulary
//! 2. `decomposition` normalizes the Chinese decomposition source against that vocabulary
//! 3. `engine` answers hierarchical AND queries against an immutable snapshot
//!
//! Query features / 查询特性：
//! - Hierarchical matching: a selected radical also matches through composite
//!   radicals whose decomposition contains it / 层级匹配
//! - Immutable versioned snapshots, atomic swap on rebuild / 不可变版本化快照

pub mod composition;
pub mod decomposition;
pub mod engine;
pub mod source;
pub mod store;

pub use composition::{build_inverse_index, InverseIndex, RadicalEntry};
pub use decomposition::DecompositionBuilder;
pub use engine::{IndexSnapshot, SharedIndex};
pub use source::{DecompositionSource, KradSnapshot, RadkSnapshot};
