//! 分析报告输出

use crate::ai::types::VisionAnalysis;
use crate::error::Result;

const RULE_WIDTH: usize = 50;

/// 文本报告
pub fn format_report(analysis: &VisionAnalysis) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut output = vec![
        rule.clone(),
        "VISION ANALYSIS REPORT".to_string(),
        rule.clone(),
        format!("\n📍 SUMMARY: {}", analysis.summary),
        format!("\n📝 DESCRIPTION: {}", analysis.description),
        format!("\n🔍 CONTEXT: {}", analysis.context),
        format!(
            "\n🚨 SUSPICION LEVEL: {}",
            analysis.suspicion_level.as_str().to_uppercase()
        ),
    ];

    if analysis.highlights.is_empty() {
        output.push("\n✅ No unusual activity detected".to_string());
    } else {
        output.push("\n⚠️ ALERTS:".to_string());
        output.extend(analysis.highlights.iter().map(|h| format!("  - {}", h)));
    }

    output.push(format!("\n{}", rule));
    output.join("\n")
}

/// JSON 报告
pub fn format_json(analysis: &VisionAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
