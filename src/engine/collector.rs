// Collector - 結果収集と進捗報告

use crate::core::{EnrichmentResult, LookupOutcome, LookupResult, ProgressReporter};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Collector: 全ワーカーの結果を受け取り、進捗を報告する
///
/// 結果チャンネルが閉じると、受信した結果を全て返す（順序は完了順）。
pub fn spawn_result_collector<R>(
    mut result_rx: mpsc::Receiver<LookupResult>,
    total_lookups: usize,
    reporter: Arc<R>,
    report_progress: bool,
) -> tokio::task::JoinHandle<EnrichmentResult<Vec<LookupResult>>>
where
    R: ProgressReporter + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut results = Vec::with_capacity(total_lookups);

        while let Some(result) = result_rx.recv().await {
            match &result.outcome {
                LookupOutcome::EnrichedWith(_) => {}
                LookupOutcome::NoTranslationAvailable => {
                    reporter
                        .report_failure(&result.scientific_name, "no translation available")
                        .await;
                }
                LookupOutcome::Failed(error) => {
                    reporter
                        .report_failure(&result.scientific_name, &error.to_string())
                        .await;
                }
            }

            results.push(result);

            if report_progress {
                reporter.report_progress(results.len(), total_lookups).await;
            }
        }

        Ok(results)
    })
}
