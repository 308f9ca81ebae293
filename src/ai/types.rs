//! 视觉模型输入 / 分析结果类型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// 可疑程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionLevel {
    /// 正常
    Normal,
    /// 异常
    Unusual,
    /// 可疑
    Suspicious,
}

impl Default for SuspicionLevel {
    fn default() -> Self {
        Self::Normal
    }
}

impl SuspicionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Unusual => "unusual",
            Self::Suspicious => "suspicious",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Normal, Self::Unusual, Self::Suspicious]
    }
}

impl std::fmt::Display for SuspicionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 视觉模型输出
///
/// 缺失字段使用默认值, 未知字段忽略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionInput {
    /// 检测到的物体标签
    #[serde(default)]
    pub detected_objects: Vec<String>,
    /// 场景
    #[serde(default = "default_scene")]
    pub scene: String,
    /// 动作
    #[serde(default = "default_action")]
    pub action: String,
    /// 时段 ("day" / "night")
    #[serde(default = "default_time")]
    pub time: String,
}

fn default_scene() -> String {
    "unknown".to_string()
}

fn default_action() -> String {
    "stationary".to_string()
}

fn default_time() -> String {
    "day".to_string()
}

impl Default for VisionInput {
    fn default() -> Self {
        Self {
            detected_objects: Vec::new(),
            scene: default_scene(),
            action: default_action(),
            time: default_time(),
        }
    }
}

impl VisionInput {
    pub fn new<I, S>(objects: I, scene: impl Into<String>, action: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            detected_objects: objects.into_iter().map(Into::into).collect(),
            scene: scene.into(),
            action: action.into(),
            time: default_time(),
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// 解析单个对象或对象数组
    pub fn parse_batch(json: &str) -> Result<Vec<Self>> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => items
                .into_iter()
                .map(|v| serde_json::from_value(v).map_err(Error::from))
                .collect(),
            v @ Value::Object(_) => Ok(vec![serde_json::from_value(v)?]),
            other => Err(Error::InvalidInput(format!(
                "expected an object or an array of objects, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 场景分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionAnalysis {
    /// 一句话摘要
    pub summary: String,
    /// 自然语言描述
    pub description: String,
    /// 上下文解读
    pub context: String,
    /// 可疑程度
    pub suspicion_level: SuspicionLevel,
    /// 告警
    pub highlights: Vec<String>,
}
