//! 视觉模型输出与分析结果

pub mod types;
