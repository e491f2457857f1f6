// Consumer - 並列ワーカー機能

use crate::{
    core::{CacheStore, EnrichmentResult, LookupResult, TranslationClient, WorkItem},
    services::processing::{lookup_single_name, InflightLookups},
};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// ワーカー間で共有する依存関係
pub struct WorkerContext<T: ?Sized, S: ?Sized> {
    pub client: Arc<T>,
    pub cache: Arc<S>,
    /// 翻訳サービス呼び出しの同時実行数を制限する
    pub limiter: Arc<Semaphore>,
    pub inflight: Arc<InflightLookups>,
}

impl<T: ?Sized, S: ?Sized> Clone for WorkerContext<T, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            limiter: Arc::clone(&self.limiter),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

/// 単一Consumerワーカー
pub fn spawn_single_consumer<T, S>(
    worker_id: usize,
    context: WorkerContext<T, S>,
    work_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<WorkItem>>>,
    result_tx: mpsc::Sender<LookupResult>,
) -> tokio::task::JoinHandle<EnrichmentResult<()>>
where
    T: TranslationClient + ?Sized + 'static,
    S: CacheStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        tracing::debug!("ワーカー{}起動", worker_id);
        loop {
            // 次の作業を取得
            let item = {
                let mut rx = work_rx.lock().await;
                match rx.recv().await {
                    Some(item) => item,
                    None => break, // チャンネル終了
                }
            };

            let result = lookup_single_name(
                context.client.as_ref(),
                context.cache.as_ref(),
                &context.limiter,
                &context.inflight,
                &item,
            )
            .await;

            // 結果送信
            if (result_tx.send(result).await).is_err() {
                // 結果チャンネルが閉じられた場合は終了
                break;
            }
        }
        tracing::debug!("ワーカー{}終了", worker_id);
        Ok(())
    })
}

/// Consumers: 並列ワーカープール
pub fn spawn_consumers<T, S>(
    context: WorkerContext<T, S>,
    work_rx: mpsc::Receiver<WorkItem>,
    result_tx: mpsc::Sender<LookupResult>,
    worker_count: usize,
) -> Vec<tokio::task::JoinHandle<EnrichmentResult<()>>>
where
    T: TranslationClient + ?Sized + 'static,
    S: CacheStore + ?Sized + 'static,
{
    let work_rx = Arc::new(tokio::sync::Mutex::new(work_rx));
    let mut handles = Vec::with_capacity(worker_count);

    for worker_id in 0..worker_count {
        let handle = spawn_single_consumer(
            worker_id,
            context.clone(),
            Arc::clone(&work_rx),
            result_tx.clone(),
        );
        handles.push(handle);
    }

    handles
}
