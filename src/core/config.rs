//! 解读器规则配置

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// 伴随物体规则: 人与该物体同时出现时的活动描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionRule {
    pub object: String,
    pub activity: String,
}

impl CompanionRule {
    pub fn new(object: impl Into<String>, activity: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            activity: activity.into(),
        }
    }
}

/// 可疑模式: 所有 token 同时出现即触发
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    pub tokens: Vec<String>,
    pub warning: String,
}

impl SuspiciousPattern {
    pub fn new(tokens: &[&str], warning: impl Into<String>) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            warning: warning.into(),
        }
    }
}

/// 解读器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// 伴随物体规则 (按顺序匹配)
    #[serde(default = "default_companions")]
    pub companions: Vec<CompanionRule>,
    /// 可疑模式 (按顺序检查)
    #[serde(default = "default_patterns")]
    pub suspicious_patterns: Vec<SuspiciousPattern>,
}

fn default_companions() -> Vec<CompanionRule> {
    vec![
        CompanionRule::new("dog", "walking a dog"),
        CompanionRule::new("bicycle", "cycling or with a bicycle"),
        CompanionRule::new("car", "near or entering a vehicle"),
        CompanionRule::new("bag", "carrying belongings"),
        CompanionRule::new("phone", "using a mobile device"),
    ]
}

fn default_patterns() -> Vec<SuspiciousPattern> {
    vec![
        SuspiciousPattern::new(&["person", "window", "night"], "possible intrusion attempt"),
        SuspiciousPattern::new(&["person", "running", "bag"], "potential theft in progress"),
        SuspiciousPattern::new(&["person", "mask", "weapon"], "armed individual"),
        SuspiciousPattern::new(&["fire", "smoke"], "fire hazard detected"),
    ]
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            companions: default_companions(),
            suspicious_patterns: default_patterns(),
        }
    }
}

impl InterpreterConfig {
    /// 从 JSON 解析并校验
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading interpreter config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.companions.iter().enumerate() {
            if rule.object.is_empty() {
                return Err(Error::InvalidConfig(format!("companion rule {} has an empty object", i)));
            }
            if rule.activity.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "companion rule {} ({}) has an empty activity",
                    i, rule.object
                )));
            }
        }

        for (i, pattern) in self.suspicious_patterns.iter().enumerate() {
            if pattern.tokens.is_empty() {
                return Err(Error::InvalidConfig(format!("suspicious pattern {} has no tokens", i)));
            }
            if pattern.tokens.iter().any(|t| t.is_empty()) {
                return Err(Error::InvalidConfig(format!("suspicious pattern {} has an empty token", i)));
            }
            if pattern.warning.is_empty() {
                return Err(Error::InvalidConfig(format!("suspicious pattern {} has an empty warning", i)));
            }
        }

        Ok(())
    }

    /// 查找物体对应的活动 (取第一条匹配规则)
    pub fn companion_activity(&self, object: &str) -> Option<&str> {
        self.companions
            .iter()
            .find(|r| r.object == object)
            .map(|r| r.activity.as_str())
    }
}
