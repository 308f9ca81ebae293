//! 告警事件
//!
//! 解读器每产生一条告警就发送一个事件

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ai::types::SuspicionLevel;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// 命中可疑模式
    PatternMatched,
    /// 异常活动
    UnusualActivity,
}

impl EventType {
    /// 该类事件对应的最低可疑程度
    pub fn level(&self) -> SuspicionLevel {
        match self {
            Self::PatternMatched => SuspicionLevel::Suspicious,
            Self::UnusualActivity => SuspicionLevel::Unusual,
        }
    }
}

/// 事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// 事件类型
    pub event_type: EventType,
    /// 可疑程度
    pub level: SuspicionLevel,
    /// 告警内容 (不含前缀)
    pub message: String,
    /// 场景
    pub scene: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, message: impl Into<String>) -> Self {
        Self {
            event_type,
            level: event_type.level(),
            message: message.into(),
            scene: None,
        }
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }
}

/// 事件发送端
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<Event>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx: Some(tx) }
    }

    /// 接收端关闭时丢弃
    pub fn emit(&self, event: Event) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
