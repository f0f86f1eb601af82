//! Utility modules shared by the pipeline and the watcher.

pub mod category;
pub mod path;
