//! 分析历史
//!
//! 最近分析结果的环形缓冲区

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use parking_lot::RwLock;

use crate::ai::types::{SuspicionLevel, VisionAnalysis};

/// 分析历史
///
/// 线程安全, clone 后共享同一存储
pub struct AnalysisHistory {
    entries: Arc<RwLock<VecDeque<VisionAnalysis>>>,
    max_size: usize,
}

impl AnalysisHistory {
    /// # Arguments
    /// * `max_size` - 最大保留条数
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    /// 添加结果, 满时丢弃最旧的
    pub fn push(&self, analysis: VisionAnalysis) {
        let mut entries = self.entries.write();
        if entries.len() >= self.max_size {
            entries.pop_front();
        }
        entries.push_back(analysis);
    }

    /// 最近的 N 条 (按时间先后)
    pub fn get_recent(&self, count: usize) -> Vec<VisionAnalysis> {
        let entries = self.entries.read();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn get_all(&self) -> Vec<VisionAnalysis> {
        self.entries.read().iter().cloned().collect()
    }

    /// 各可疑程度的数量 (包含数量为 0 的等级)
    pub fn level_counts(&self) -> BTreeMap<SuspicionLevel, usize> {
        let mut counts: BTreeMap<_, _> = SuspicionLevel::all().into_iter().map(|l| (l, 0)).collect();
        for analysis in self.entries.read().iter() {
            *counts.entry(analysis.suspicion_level).or_insert(0) += 1;
        }
        counts
    }

    pub fn highest_level(&self) -> Option<SuspicionLevel> {
        self.entries.read().iter().map(|a| a.suspicion_level).max()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Clone for AnalysisHistory {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            max_size: self.max_size,
        }
    }
}

impl Default for AnalysisHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
