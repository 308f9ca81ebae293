//! 解读核心

pub mod config;
pub mod event;
pub mod interpreter;
pub mod report;
