// Pipeline - Producer-Consumer パイプライン
// 作業配信、ワーカープール、結果収集のオーケストレーション

use super::{
    collector::spawn_result_collector,
    consumer::{spawn_consumers, WorkerContext},
    producer::spawn_producer,
};
use crate::core::{
    CacheStore, EnrichmentConfig, EnrichmentResult, LookupResult, ProgressReporter,
    TranslationClient, WorkItem,
};
use crate::services::processing::InflightLookups;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// 1コレクション分の参照を並列実行するパイプライン
pub struct LookupPipeline<T: ?Sized, S: ?Sized> {
    client: Arc<T>,
    cache: Arc<S>,
    inflight: Arc<InflightLookups>,
}

impl<T, S> LookupPipeline<T, S>
where
    T: TranslationClient + ?Sized + 'static,
    S: CacheStore + ?Sized + 'static,
{
    pub fn new(client: Arc<T>, cache: Arc<S>, inflight: Arc<InflightLookups>) -> Self {
        Self {
            client,
            cache,
            inflight,
        }
    }

    /// 全ての作業単位を処理し、作業単位ごとに1つの結果を返す
    pub async fn execute<C, R>(
        &self,
        items: Vec<WorkItem>,
        config: &C,
        reporter: Arc<R>,
    ) -> EnrichmentResult<Vec<LookupResult>>
    where
        C: EnrichmentConfig + ?Sized,
        R: ProgressReporter + ?Sized + 'static,
    {
        let total_lookups = items.len();
        let worker_count = config.max_concurrent_lookups();

        // Producer-Consumerチャンネル構築
        let (work_tx, work_rx) = mpsc::channel::<WorkItem>(config.channel_buffer_size());
        let (result_tx, result_rx) = mpsc::channel::<LookupResult>(config.channel_buffer_size());

        let context = WorkerContext {
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            limiter: Arc::new(Semaphore::new(worker_count)),
            inflight: Arc::clone(&self.inflight),
        };

        tracing::debug!("パイプライン開始: {} 件, ワーカー {}", total_lookups, worker_count);

        // Producer起動
        let producer_handle = spawn_producer(items, work_tx);

        // Consumer Pool起動
        let consumer_handles = spawn_consumers(context, work_rx, result_tx.clone(), worker_count);

        // Result Collector起動
        let collector_handle = spawn_result_collector(
            result_rx,
            total_lookups,
            reporter,
            config.enable_progress_reporting(),
        );

        // Producer完了を待機
        producer_handle.await??;

        // Consumer完了を待機
        for handle in consumer_handles {
            handle.await??;
        }

        // result_txを閉じてCollectorに完了を通知
        drop(result_tx);

        // Collector完了を待機
        let results = collector_handle.await??;

        tracing::debug!("パイプライン完了: {} 件", results.len());
        Ok(results)
    }
}
