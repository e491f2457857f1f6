// RunCoordinator - 複数コレクションを順番に処理する

use super::enrichment_engine::EnrichmentEngine;
use crate::{
    core::{
        CacheStore, EnrichmentConfig, EnrichmentError, EnrichmentResult, ProgressReporter,
        Record, RunReport, TranslationClient,
    },
    services::{config::CollectionSpec, processing::InflightLookups},
    storage::RecordStorage,
};
use std::path::Path;
use std::sync::Arc;

/// 実行全体の調整役
///
/// コレクションは1つずつ処理し（並列化はコレクション内のみ）、
/// 全コレクションの失敗を1つのレポートにまとめて最後に書き出す。
pub struct RunCoordinator<T, S, St, C, R> {
    engine: EnrichmentEngine<T, S, St, C, R>,
}

impl<T, S, St, C, R> RunCoordinator<T, S, St, C, R>
where
    T: TranslationClient + 'static,
    S: CacheStore + 'static,
    St: RecordStorage,
    C: EnrichmentConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(engine: EnrichmentEngine<T, S, St, C, R>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &EnrichmentEngine<T, S, St, C, R> {
        &self.engine
    }

    /// 全コレクションを処理し、失敗レポートを書き出す
    ///
    /// 致命的エラー（キャッシュ破損、コレクション読み書き失敗など）で中断する。
    pub async fn run(
        &self,
        collections: &[CollectionSpec],
        failure_report_path: &Path,
    ) -> EnrichmentResult<RunReport> {
        let started_at = chrono::Utc::now();
        let inflight = Arc::new(InflightLookups::new());
        let mut summaries = Vec::with_capacity(collections.len());

        for spec in collections {
            tracing::info!("カテゴリ処理開始: {} ({})", spec.category, spec.path.display());
            let summary = self
                .engine
                .enrich_within_run(&spec.path, &spec.category, Arc::clone(&inflight))
                .await?;
            summaries.push(summary);
        }

        // レポートは元のレコードのみ（理由タグは出力しない）
        let failed_records: Vec<Record> = summaries
            .iter()
            .flat_map(|summary| summary.failures.iter().map(|failure| failure.record.clone()))
            .collect();

        self.engine
            .storage()
            .save_records(failure_report_path, &failed_records)
            .await
            .map_err(|e| EnrichmentError::collection_io(failure_report_path, e))?;

        tracing::info!(
            "失敗レポート書き込み: {} ({} 件)",
            failure_report_path.display(),
            failed_records.len()
        );

        Ok(RunReport {
            collections: summaries,
            total_failures: failed_records.len(),
            started_at,
            finished_at: chrono::Utc::now(),
        })
    }
}
