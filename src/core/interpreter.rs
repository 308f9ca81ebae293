//! 视觉解读器
//!
//! 把视觉模型的检测结果转换为场景摘要、描述、上下文和可疑活动告警

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::ai::types::{SuspicionLevel, VisionAnalysis, VisionInput};
use crate::core::config::InterpreterConfig;
use crate::core::event::{Event, EventSink, EventType};

/// 告警前缀
pub const HIGHLIGHT_PREFIX: &str = "⚠️ ";

const PERSON: &str = "person";

/// 单条检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
struct Finding {
    event_type: EventType,
    message: String,
}

/// 视觉解读器
pub struct VisionInterpreter {
    config: InterpreterConfig,
    events: EventSink,
}

impl VisionInterpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        info!(
            "Interpreter initialized: {} companion rules, {} suspicious patterns",
            config.companions.len(),
            config.suspicious_patterns.len()
        );
        Self {
            config,
            events: EventSink::default(),
        }
    }

    /// 设置事件通道
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// 分析一条视觉模型输出
    pub fn analyze(&self, input: &VisionInput) -> VisionAnalysis {
        let objects = &input.detected_objects;
        let scene = input.scene.as_str();
        let action = input.action.as_str();

        let summary = self.generate_summary(objects, scene, action);
        let description = self.create_description(objects, scene, action);
        let context = self.analyze_context(objects, scene, action);

        let findings = self.findings(objects, scene, action, &input.time);
        for finding in &findings {
            self.events
                .emit(Event::new(finding.event_type, finding.message.clone()).with_scene(scene));
        }
        let (suspicion_level, highlights) = assess(findings);

        debug!(
            "Analyzed {} objects in {:?}: level={}, highlights={}",
            objects.len(),
            scene,
            suspicion_level,
            highlights.len()
        );

        VisionAnalysis {
            summary,
            description,
            context,
            suspicion_level,
            highlights,
        }
    }

    /// 批量分析
    pub fn analyze_all(&self, inputs: &[VisionInput]) -> Vec<VisionAnalysis> {
        inputs.iter().map(|input| self.analyze(input)).collect()
    }

    /// 一句话摘要
    pub fn generate_summary(&self, objects: &[String], scene: &str, action: &str) -> String {
        match objects.first() {
            None => format!("Empty {} scene detected.", scene),
            Some(main_subject) => format!("A {} {} in a {} setting.", main_subject, action, scene),
        }
    }

    /// 自然语言描述
    pub fn create_description(&self, objects: &[String], scene: &str, action: &str) -> String {
        if objects.is_empty() {
            return format!("The camera shows an empty {} with no significant activity.", scene);
        }

        let others: Vec<&str> = objects
            .iter()
            .map(String::as_str)
            .filter(|o| *o != PERSON)
            .collect();

        let mut parts = Vec::new();

        if others.len() < objects.len() {
            // 最后一个有伴随规则的物体决定描述
            let activity = others
                .iter()
                .filter_map(|o| self.config.companion_activity(o))
                .last()
                .unwrap_or(action);
            parts.push(format!("A person is {}", activity));
        }

        match others.as_slice() {
            [] => {}
            [single] => parts.push(format!("A {} is also visible", single)),
            many => parts.push(format!("Also visible: {}", many.join(", "))),
        }

        format!("{} on a {}.", parts.join(". "), scene)
    }

    /// 上下文解读
    pub fn analyze_context(&self, objects: &[String], scene: &str, action: &str) -> String {
        let mut contexts = Vec::new();

        match scene {
            "street" | "sidewalk" | "road" => contexts.push("This appears to be a public urban area"),
            "park" | "garden" | "field" => contexts.push("This is an outdoor recreational area"),
            "home" | "house" | "apartment" => contexts.push("This is a residential setting"),
            "store" | "shop" | "mall" => contexts.push("This is a commercial environment"),
            _ => {}
        }

        match action {
            "running" | "jogging" => contexts.push("showing active movement"),
            "sitting" | "standing" | "waiting" => contexts.push("with minimal activity"),
            "walking" | "strolling" => contexts.push("with normal pedestrian movement"),
            _ => {}
        }

        let has = |label: &str| objects.iter().any(|o| o == label);
        if has(PERSON) && has("dog") {
            contexts.push("likely a pet owner during routine exercise");
        } else if has(PERSON) && has("bicycle") {
            contexts.push("suggesting eco-friendly transportation or recreation");
        }

        if contexts.is_empty() {
            "Standard scene with typical elements.".to_string()
        } else {
            format!("{}.", contexts.join(". "))
        }
    }

    /// 可疑活动检查
    pub fn check_suspicious_activity(
        &self,
        objects: &[String],
        scene: &str,
        action: &str,
        time: &str,
    ) -> (SuspicionLevel, Vec<String>) {
        assess(self.findings(objects, scene, action, time))
    }

    fn findings(&self, objects: &[String], scene: &str, action: &str, time: &str) -> Vec<Finding> {
        let observed = |token: &str| token == action || token == time || objects.iter().any(|o| o == token);
        let mut findings = Vec::new();

        for pattern in &self.config.suspicious_patterns {
            if pattern.tokens.iter().all(|t| observed(t.as_str())) {
                findings.push(Finding {
                    event_type: EventType::PatternMatched,
                    message: pattern.warning.clone(),
                });
            }
        }

        let has_person = objects.iter().any(|o| o == PERSON);
        // 每项都要求列出的 token 实际出现, 不会对任意输入触发
        let unusual_checks = [
            (
                observed(PERSON) && observed("running") && time == "night",
                "Person running at night",
            ),
            (
                has_person && scene == "restricted",
                "Unauthorized person in restricted area",
            ),
            (
                action == "climbing" && scene != "gym",
                "Unusual climbing activity",
            ),
            (
                observed("crowd") && observed("running"),
                "Multiple people running - possible emergency",
            ),
        ];

        for (condition, message) in unusual_checks {
            if condition {
                findings.push(Finding {
                    event_type: EventType::UnusualActivity,
                    message: message.to_string(),
                });
            }
        }

        findings
    }
}

impl Default for VisionInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// 可疑模式优先于异常检查, 等级只升不降
fn assess(findings: Vec<Finding>) -> (SuspicionLevel, Vec<String>) {
    let level = findings
        .iter()
        .map(|f| f.event_type.level())
        .max()
        .unwrap_or(SuspicionLevel::Normal);
    let highlights = findings
        .into_iter()
        .map(|f| format!("{}{}", HIGHLIGHT_PREFIX, f.message))
        .collect();
    (level, highlights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CompanionRule, SuspiciousPattern};

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_person_with_companions() {
        let interpreter = VisionInterpreter::new();
        let input = VisionInput::new(["person", "dog", "bicycle"], "street", "walking");
        let analysis = interpreter.analyze(&input);

        assert_eq!(analysis.summary, "A person walking in a street setting.");
        // 最后一个匹配的物体 (bicycle) 决定描述
        assert_eq!(
            analysis.description,
            "A person is cycling or with a bicycle. Also visible: dog, bicycle on a street."
        );
        assert_eq!(
            analysis.context,
            "This appears to be a public urban area. with normal pedestrian movement. \
             likely a pet owner during routine exercise."
        );
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Normal);
        assert!(analysis.highlights.is_empty());
    }

    #[test]
    fn test_theft_at_night() {
        let interpreter = VisionInterpreter::new();
        let input = VisionInput::new(["person", "bag", "running"], "store", "running").with_time("night");
        let analysis = interpreter.analyze(&input);

        assert_eq!(
            analysis.description,
            "A person is carrying belongings. Also visible: bag, running on a store."
        );
        assert_eq!(
            analysis.context,
            "This is a commercial environment. showing active movement."
        );
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Suspicious);
        assert_eq!(
            analysis.highlights,
            vec![
                "⚠️ potential theft in progress".to_string(),
                "⚠️ Person running at night".to_string(),
            ]
        );
    }

    #[test]
    fn test_incomplete_pattern_is_normal() {
        let interpreter = VisionInterpreter::new();
        let input = VisionInput::new(["car", "person", "smoke"], "parking lot", "standing");
        let analysis = interpreter.analyze(&input);

        assert_eq!(analysis.summary, "A car standing in a parking lot setting.");
        assert_eq!(
            analysis.description,
            "A person is near or entering a vehicle. Also visible: car, smoke on a parking lot."
        );
        assert_eq!(analysis.context, "with minimal activity.");
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Normal);
        assert!(analysis.highlights.is_empty());
    }

    #[test]
    fn test_intrusion_keeps_suspicious_level() {
        let interpreter = VisionInterpreter::new();
        let input = VisionInput::new(["person", "ladder", "window"], "house", "climbing").with_time("night");
        let analysis = interpreter.analyze(&input);

        assert_eq!(analysis.context, "This is a residential setting.");
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Suspicious);
        assert_eq!(
            analysis.highlights,
            vec![
                "⚠️ possible intrusion attempt".to_string(),
                "⚠️ Unusual climbing activity".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_scene() {
        let interpreter = VisionInterpreter::new();
        let analysis = interpreter.analyze(&VisionInput::default());

        assert_eq!(analysis.summary, "Empty unknown scene detected.");
        assert_eq!(
            analysis.description,
            "The camera shows an empty unknown with no significant activity."
        );
        assert_eq!(analysis.context, "Standard scene with typical elements.");
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Normal);
    }

    #[test]
    fn test_description_without_person() {
        let interpreter = VisionInterpreter::new();
        assert_eq!(
            interpreter.create_description(&labels(&["car"]), "road", "parked"),
            "A car is also visible on a road."
        );
        assert_eq!(
            interpreter.create_description(&labels(&["person"]), "park", "sitting"),
            "A person is sitting on a park."
        );
    }

    #[test]
    fn test_unusual_checks() {
        let interpreter = VisionInterpreter::new();

        let (level, highlights) =
            interpreter.check_suspicious_activity(&labels(&["person"]), "restricted", "standing", "day");
        assert_eq!(level, SuspicionLevel::Unusual);
        assert_eq!(highlights, vec!["⚠️ Unauthorized person in restricted area"]);

        // 健身房攀爬不算异常
        let (level, highlights) =
            interpreter.check_suspicious_activity(&labels(&["person"]), "gym", "climbing", "day");
        assert_eq!(level, SuspicionLevel::Normal);
        assert!(highlights.is_empty());

        let (level, highlights) =
            interpreter.check_suspicious_activity(&labels(&["crowd"]), "street", "running", "day");
        assert_eq!(level, SuspicionLevel::Unusual);
        assert_eq!(highlights, vec!["⚠️ Multiple people running - possible emergency"]);

        // 白天跑步正常
        let (level, _) =
            interpreter.check_suspicious_activity(&labels(&["person"]), "park", "running", "day");
        assert_eq!(level, SuspicionLevel::Normal);
    }

    #[test]
    fn test_custom_config() {
        let config = InterpreterConfig {
            companions: vec![CompanionRule::new("stroller", "pushing a stroller")],
            suspicious_patterns: vec![SuspiciousPattern::new(&["person", "crowbar"], "tampering with property")],
        };
        let interpreter = VisionInterpreter::with_config(config);

        let input = VisionInput::new(["person", "stroller"], "sidewalk", "walking");
        assert_eq!(
            interpreter.analyze(&input).description,
            "A person is pushing a stroller. A stroller is also visible on a sidewalk."
        );

        let input = VisionInput::new(["person", "crowbar"], "home", "standing");
        let analysis = interpreter.analyze(&input);
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Suspicious);
        assert_eq!(analysis.highlights, vec!["⚠️ tampering with property"]);
    }

    #[test]
    fn test_empty_pattern_table_disables_patterns() {
        let config = InterpreterConfig::from_json(r#"{"suspicious_patterns": []}"#).unwrap();
        let interpreter = VisionInterpreter::with_config(config);

        let analysis = interpreter.analyze(&VisionInput::new(["fire", "smoke"], "field", "stationary"));
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Normal);
        assert!(analysis.highlights.is_empty());

        // 固定的异常检查不受影响
        let analysis = interpreter.analyze(&VisionInput::new(["person"], "house", "climbing"));
        assert_eq!(analysis.suspicion_level, SuspicionLevel::Unusual);
        assert_eq!(analysis.highlights, vec!["⚠️ Unusual climbing activity"]);
    }

    #[test]
    fn test_events_emitted() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let interpreter = VisionInterpreter::new().with_event_channel(tx);

        let input = VisionInput::new(["person", "ladder", "window"], "house", "climbing").with_time("night");
        interpreter.analyze(&input);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.event_type, EventType::PatternMatched);
        assert_eq!(first.message, "possible intrusion attempt");
        assert_eq!(first.scene.as_deref(), Some("house"));

        let second = rx.try_recv().unwrap();
        assert_eq!(second.event_type, EventType::UnusualActivity);
        assert_eq!(second.level, SuspicionLevel::Unusual);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_analyze_all() {
        let interpreter = VisionInterpreter::default();
        let inputs = vec![
            VisionInput::default(),
            VisionInput::new(["fire", "smoke"], "field", "stationary"),
        ];
        let analyses = interpreter.analyze_all(&inputs);
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[1].suspicion_level, SuspicionLevel::Suspicious);
        assert_eq!(analyses[1].highlights, vec!["⚠️ fire hazard detected"]);
    }
}
