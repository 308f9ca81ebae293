//! 缓冲区模块

pub mod history;

pub use history::AnalysisHistory;
