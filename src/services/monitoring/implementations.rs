// 進捗監視の具象実装

use crate::core::{Category, ProgressReporter};
use async_trait::async_trait;

/// 何件ごとに進捗を表示するか
const PROGRESS_INTERVAL: usize = 25;

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, category: &Category, total_lookups: usize) {
        if !self.quiet {
            println!("🚀 Enriching '{category}': {total_lookups} records to look up...");
        }
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if !self.quiet && total > 0 && (completed % PROGRESS_INTERVAL == 0 || completed == total) {
            let percentage = (completed as f64 / total as f64) * 100.0;
            println!("📊 Progress: {completed}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_failure(&self, scientific_name: &str, reason: &str) {
        if !self.quiet {
            eprintln!("⚠️  Not enriched {scientific_name}: {reason}");
        }
    }

    async fn report_completed(&self, enriched: usize, failed: usize) {
        if !self.quiet {
            println!("✅ Completed! Enriched: {enriched}, Failed: {failed}");
        }
    }
}

/// 何もしない進捗報告実装（テスト用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _category: &Category, _total_lookups: usize) {
        // 何もしない
    }

    async fn report_progress(&self, _completed: usize, _total: usize) {
        // 何もしない
    }

    async fn report_failure(&self, _scientific_name: &str, _reason: &str) {
        // 何もしない
    }

    async fn report_completed(&self, _enriched: usize, _failed: usize) {
        // 何もしない
    }
}
