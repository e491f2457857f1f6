// Producer - 作業単位の配信機能

use crate::core::{EnrichmentResult, WorkItem};
use tokio::sync::mpsc;

/// Producer: 参照対象を配信
pub fn spawn_producer(
    items: Vec<WorkItem>,
    work_tx: mpsc::Sender<WorkItem>,
) -> tokio::task::JoinHandle<EnrichmentResult<()>> {
    tokio::spawn(async move {
        for item in items {
            if (work_tx.send(item).await).is_err() {
                // チャンネルが閉じられた場合は正常終了
                break;
            }
        }
        // work_txをドロップしてチャンネル終了シグナル
        Ok(())
    })
}
