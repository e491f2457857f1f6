// 高レベル公開API
// 本番構成の RunCoordinator を組み立てる

use super::{EnrichmentEngine, RunCoordinator};
use crate::{
    core::{EnrichmentError, EnrichmentResult, ProgressReporter},
    services::{
        AppConfig, ChatCompletionClient, ConsoleProgressReporter, DefaultEnrichmentConfig,
        JsonCacheStore, NoOpProgressReporter,
    },
    storage::local::LocalRecordStorage,
};

/// 本番構成のコーディネーター
pub type DefaultRunCoordinator = RunCoordinator<
    ChatCompletionClient,
    JsonCacheStore,
    LocalRecordStorage,
    DefaultEnrichmentConfig,
    Box<dyn ProgressReporter>,
>;

/// アプリケーション設定から本番構成のコーディネーターを組み立てる
///
/// キャッシュファイルが破損している場合はここで失敗する。
pub async fn build_run_coordinator(
    app_config: &AppConfig,
    pool_config: DefaultEnrichmentConfig,
    quiet: bool,
) -> EnrichmentResult<DefaultRunCoordinator> {
    app_config.validate()?;

    let client = ChatCompletionClient::new(app_config.translation.clone())
        .map_err(|e| EnrichmentError::configuration(e.to_string()))?;
    let cache = JsonCacheStore::load(&app_config.cache_path).await?;

    let reporter: Box<dyn ProgressReporter> = if quiet {
        Box::new(NoOpProgressReporter::new())
    } else {
        Box::new(ConsoleProgressReporter::new())
    };

    let engine = EnrichmentEngine::new(
        client,
        cache,
        LocalRecordStorage::new(),
        pool_config.with_progress_reporting(!quiet),
        reporter,
    );

    Ok(RunCoordinator::new(engine))
}
