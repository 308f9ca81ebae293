//! 视觉解读系统核心库
//!
//! 视觉模型检测结果 → 规则解读 → 场景描述 + 可疑活动告警
//! - 摘要 / 描述 / 上下文: 由物体、场景、动作推断
//! - 可疑检查: 可配置的模式表 + 固定的异常检查
//! - 告警通过事件通道发送

pub mod ai;
pub mod buffer;
pub mod core;
pub mod error;

// Re-exports - 核心
pub use crate::core::interpreter::{VisionInterpreter, HIGHLIGHT_PREFIX};
pub use crate::core::config::{InterpreterConfig, CompanionRule, SuspiciousPattern};
pub use crate::core::event::{Event, EventType, EventSink};
pub use crate::core::report::{format_report, format_json};

// Re-exports - 类型
pub use crate::ai::types::{VisionInput, VisionAnalysis, SuspicionLevel};
pub use crate::buffer::AnalysisHistory;
pub use crate::error::{Error, Result};
