//! 视觉解读命令行
//!
//! 从文件或 stdin 读取视觉模型输出 (单个对象或数组), 输出分析报告

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use vision_interpreter::{
    format_json, format_report, AnalysisHistory, Event, InterpreterConfig, SuspicionLevel,
    VisionAnalysis, VisionInput, VisionInterpreter,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Interpret vision model detections into scene descriptions and alerts.
#[derive(Clone, Debug, Parser)]
struct Options {
    /// JSON input file (an object or an array of objects). Reads stdin when omitted.
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Rule table file overriding the built-in companion rules and suspicious patterns.
    #[clap(short, long, env = "VISION_INTERPRETER_CONFIG")]
    config: Option<PathBuf>,

    /// Report format.
    #[clap(short, long, value_enum, env = "VISION_INTERPRETER_FORMAT", default_value = "text")]
    format: OutputFormat,

    /// Run the built-in sample scenes instead of reading input.
    #[clap(long)]
    demo: bool,

    /// Number of analyses kept for the run summary.
    #[clap(long, default_value = "100")]
    history: usize,

    /// Log level.
    #[clap(long, env = "VISION_INTERPRETER_LOG", default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Options::parse();

    // 日志写 stderr, 报告写 stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(opt.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &opt.config {
        Some(path) => InterpreterConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => InterpreterConfig::default(),
    };

    let (records, inputs) = if opt.demo {
        demo_inputs()?
    } else {
        (Vec::new(), read_inputs(opt.input.as_ref())?)
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let alert_task = tokio::spawn(log_alerts(event_rx));

    let interpreter = VisionInterpreter::with_config(config).with_event_channel(event_tx);
    let history = AnalysisHistory::new(opt.history);
    let mut summary = RunSummary::new();

    for (i, input) in inputs.iter().enumerate() {
        if let Some(record) = records.get(i) {
            println!("\nTest Case {}:", i + 1);
            println!("Input: {}", serde_json::to_string_pretty(record)?);
        }

        let analysis = interpreter.analyze(input);
        match opt.format {
            OutputFormat::Text => println!("{}", format_report(&analysis)),
            OutputFormat::Json => println!("{}", format_json(&analysis)?),
        }
        summary.record(&analysis);
        history.push(analysis);

        if opt.demo {
            println!("\n{}", "-".repeat(50));
        }
    }

    // 关闭发送端, 等待告警任务结束
    drop(interpreter);
    let alerts = alert_task.await?;

    info!(
        "Processed {} scenes: {} normal, {} unusual, {} suspicious, {} alerts",
        summary.scenes,
        summary.count(SuspicionLevel::Normal),
        summary.count(SuspicionLevel::Unusual),
        summary.count(SuspicionLevel::Suspicious),
        alerts
    );
    debug!(
        "History holds {} of {} analyses (capacity {})",
        history.len(),
        summary.scenes,
        history.capacity()
    );

    Ok(())
}

/// 全部分析结果的统计 (不受历史容量限制)
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSummary {
    scenes: usize,
    counts: BTreeMap<SuspicionLevel, usize>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            scenes: 0,
            counts: SuspicionLevel::all().into_iter().map(|l| (l, 0)).collect(),
        }
    }

    fn record(&mut self, analysis: &VisionAnalysis) {
        self.scenes += 1;
        *self.counts.entry(analysis.suspicion_level).or_insert(0) += 1;
    }

    fn count(&self, level: SuspicionLevel) -> usize {
        self.counts.get(&level).copied().unwrap_or(0)
    }
}

async fn log_alerts(mut rx: mpsc::UnboundedReceiver<Event>) -> usize {
    let mut count = 0;
    while let Some(event) = rx.recv().await {
        count += 1;
        warn!(
            "[{}] {} (scene: {})",
            event.level,
            event.message,
            event.scene.as_deref().unwrap_or("unknown")
        );
    }
    count
}

fn read_inputs(path: Option<&PathBuf>) -> anyhow::Result<Vec<VisionInput>> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let inputs = VisionInput::parse_batch(&json).context("failed to parse vision input")?;
    info!("Loaded {} vision records", inputs.len());
    Ok(inputs)
}

// ============================================================
// 示例场景
// ============================================================

/// 原始记录 (用于回显) 和解析后的输入
fn demo_inputs() -> anyhow::Result<(Vec<Value>, Vec<VisionInput>)> {
    let records = vec![
        json!({
            "detected_objects": ["person", "dog", "bicycle"],
            "scene": "street",
            "action": "walking"
        }),
        json!({
            "detected_objects": ["person", "bag", "running"],
            "scene": "store",
            "action": "running",
            "time": "night"
        }),
        json!({
            "detected_objects": ["car", "person", "smoke"],
            "scene": "parking lot",
            "action": "standing"
        }),
        json!({
            "detected_objects": ["person", "ladder", "window"],
            "scene": "house",
            "action": "climbing",
            "time": "night"
        }),
    ];
    let inputs = records
        .iter()
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<VisionInput>, _>>()
        .context("invalid demo record")?;
    Ok((records, inputs))
}
