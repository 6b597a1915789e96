pub mod config;
pub mod db;
pub mod index;
pub mod models;

pub use crate::index::engine::{IndexSnapshot, SharedIndex};
