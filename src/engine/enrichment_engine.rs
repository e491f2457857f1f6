// EnrichmentEngine - 1コレクション分のエンリッチ処理
// 全ての依存関係がコンストラクタで注入される

use super::pipeline::LookupPipeline;
use crate::{
    core::{
        CacheStore, Category, EnrichmentConfig, EnrichmentError, EnrichmentResult,
        EnrichmentSummary, FailedRecord, FailureReason, LookupOutcome, LookupSource,
        ProgressReporter, TranslationClient, WorkItem,
    },
    services::processing::InflightLookups,
    storage::RecordStorage,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// レコードコレクションのエンリッチエンジン
///
/// 依存関係はArcで保持し、パイプラインのワーカーと共有する。
/// 参照の集約（同じ学名は1回だけ問い合わせる）は1回の実行の間だけ有効。
pub struct EnrichmentEngine<T, S, St, C, R> {
    client: Arc<T>,
    cache: Arc<S>,
    storage: Arc<St>,
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<T, S, St, C, R> EnrichmentEngine<T, S, St, C, R>
where
    T: TranslationClient + 'static,
    S: CacheStore + 'static,
    St: RecordStorage,
    C: EnrichmentConfig,
    R: ProgressReporter + 'static,
{
    /// 新しいエンジンを作成（Constructor Injection）
    pub fn new(client: T, cache: S, storage: St, config: C, reporter: R) -> Self {
        Self::from_shared(
            Arc::new(client),
            Arc::new(cache),
            Arc::new(storage),
            Arc::new(config),
            Arc::new(reporter),
        )
    }

    /// 既に共有されている依存関係から作成
    pub fn from_shared(
        client: Arc<T>,
        cache: Arc<S>,
        storage: Arc<St>,
        config: Arc<C>,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            client,
            cache,
            storage,
            config,
            reporter,
        }
    }

    /// コレクションを読み込み、エンリッチし、同じ場所へ書き戻す
    ///
    /// 個々の参照失敗は `failures` に入り、エラーにはならない。
    /// 呼び出しごとに新しい実行として扱う。
    pub async fn enrich(
        &self,
        collection_path: &Path,
        category: &Category,
    ) -> EnrichmentResult<EnrichmentSummary> {
        self.enrich_within_run(collection_path, category, Arc::new(InflightLookups::new()))
            .await
    }

    /// 実行中の参照を共有しながらコレクションをエンリッチする
    ///
    /// `inflight` は失敗結果も保持する。実行ごとに新しく作ること。
    pub async fn enrich_within_run(
        &self,
        collection_path: &Path,
        category: &Category,
        inflight: Arc<InflightLookups>,
    ) -> EnrichmentResult<EnrichmentSummary> {
        let start_time = Instant::now();
        self.validate_config()?;

        let mut records = self
            .storage
            .load_records(collection_path)
            .await
            .map_err(|e| EnrichmentError::collection_io(collection_path, e))?;

        // 学名のないレコードは対象外
        let items: Vec<WorkItem> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.enrichment_key().map(|name| WorkItem {
                    index,
                    category: category.clone(),
                    scientific_name: name.to_string(),
                })
            })
            .collect();
        let lookup_count = items.len();
        let skipped_count = records.len() - lookup_count;

        tracing::info!(
            "コレクション読み込み: {} ({} 件, 対象 {} 件, 学名なし {} 件)",
            collection_path.display(),
            records.len(),
            lookup_count,
            skipped_count
        );
        self.reporter.report_started(category, lookup_count).await;

        let pipeline = LookupPipeline::new(
            Arc::clone(&self.client),
            Arc::clone(&self.cache),
            inflight,
        );
        let mut results = pipeline
            .execute(items, self.config.as_ref(), Arc::clone(&self.reporter))
            .await?;

        if results.len() != lookup_count {
            return Err(EnrichmentError::channel(format!(
                "結果数が一致しません: 期待 {}, 実際 {}",
                lookup_count,
                results.len()
            )));
        }
        results.sort_by_key(|result| result.index);

        let mut enriched_count = 0;
        let mut service_calls = 0;
        let mut cache_hits = 0;
        let mut failures = Vec::new();

        for result in results {
            match result.source {
                LookupSource::Service => service_calls += 1,
                LookupSource::Cache => cache_hits += 1,
                LookupSource::Coalesced => {}
            }

            let Some(record) = records.get_mut(result.index) else {
                return Err(EnrichmentError::channel(format!(
                    "不正なレコード位置: {}",
                    result.index
                )));
            };

            let reason = match result.outcome {
                LookupOutcome::EnrichedWith(text) => {
                    record.translated_name = Some(text);
                    enriched_count += 1;
                    continue;
                }
                LookupOutcome::NoTranslationAvailable => FailureReason::NoTranslationAvailable,
                LookupOutcome::Failed(error) => FailureReason::LookupFailed(error),
            };

            tracing::warn!("エンリッチ失敗: {} ({})", result.scientific_name, reason);
            failures.push(FailedRecord {
                category: category.clone(),
                record: record.clone(),
                reason,
            });
        }

        self.storage
            .save_records(collection_path, &records)
            .await
            .map_err(|e| EnrichmentError::collection_io(collection_path, e))?;

        self.reporter
            .report_completed(enriched_count, failures.len())
            .await;

        let summary = EnrichmentSummary {
            category: category.clone(),
            total_records: records.len(),
            enriched_count,
            skipped_count,
            failures,
            service_calls,
            cache_hits,
            total_processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "コレクション完了: {} (エンリッチ {}, 失敗 {}, 翻訳なし {}, 呼び出し {}, キャッシュ {})",
            category,
            summary.enriched_count,
            summary.failed_count(),
            summary.unavailable_count(),
            summary.service_calls,
            summary.cache_hits
        );

        Ok(summary)
    }

    fn validate_config(&self) -> EnrichmentResult<()> {
        if self.config.max_concurrent_lookups() == 0 {
            return Err(EnrichmentError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }

        if self.config.channel_buffer_size() == 0 {
            return Err(EnrichmentError::configuration(
                "チャンネルバッファサイズは1以上である必要があります",
            ));
        }

        Ok(())
    }

    /// ストレージへの参照を取得
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// キャッシュへの参照を取得
    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// 設定への参照を取得（読み取り専用アクセス）
    pub fn config(&self) -> &C {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{MockEnrichmentConfig, MockProgressReporter};
    use crate::core::{CacheKey, CacheValue, Record, TranslationError};
    use crate::services::cache::MemoryCacheStore;
    use crate::services::config::DefaultEnrichmentConfig;
    use crate::services::monitoring::NoOpProgressReporter;
    use crate::services::translation::ScriptedTranslationClient;
    use crate::storage::local::LocalRecordStorage;
    use crate::storage::MockRecordStorage;
    use std::fs;
    use tempfile::TempDir;

    type TestEngine<St = LocalRecordStorage> = EnrichmentEngine<
        ScriptedTranslationClient,
        MemoryCacheStore,
        St,
        DefaultEnrichmentConfig,
        NoOpProgressReporter,
    >;

    fn engine(client: ScriptedTranslationClient, cache: MemoryCacheStore) -> TestEngine {
        EnrichmentEngine::new(
            client,
            cache,
            LocalRecordStorage::new(),
            DefaultEnrichmentConfig::default(),
            NoOpProgressReporter::new(),
        )
    }

    fn write_collection(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("toxic.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn read_collection(path: &Path) -> Vec<Record> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn toxic() -> Category {
        Category::from("toxic")
    }

    #[tokio::test]
    async fn test_enrich_sets_translated_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(&temp_dir, r#"[{"scientific_name": "Aloe vera"}]"#);
        let engine = engine(
            ScriptedTranslationClient::new().with_translation("Aloe vera", "Aloe"),
            MemoryCacheStore::new(),
        );

        let summary = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(summary.enriched_count, 1);
        assert!(summary.failures.is_empty());
        assert_eq!(read_collection(&path)[0].translated_name.as_deref(), Some("Aloe"));
        assert_eq!(
            engine.cache().lookup(&CacheKey::new(toxic(), "Aloe vera")).await,
            Some(CacheValue::Translated("Aloe".to_string()))
        );
    }

    #[tokio::test]
    async fn test_enrich_timeout_goes_to_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(&temp_dir, r#"[{"scientific_name": "Aloe vera"}]"#);
        let engine = engine(
            ScriptedTranslationClient::new()
                .with_error("Aloe vera", TranslationError::Timeout { seconds: 30 }),
            MemoryCacheStore::new(),
        );

        let summary = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(summary.enriched_count, 0);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failures[0].record.scientific_name.as_deref(), Some("Aloe vera"));
        assert!(matches!(summary.failures[0].reason, FailureReason::LookupFailed(_)));
        assert!(engine.cache().is_empty().await);
        assert_eq!(read_collection(&path)[0].translated_name, None);
    }

    #[tokio::test]
    async fn test_enrich_again_retries_failed_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(&temp_dir, r#"[{"scientific_name": "Rosa"}]"#);
        let client = Arc::new(
            ScriptedTranslationClient::new()
                .with_translation("Rosa", "Róża")
                .with_error_once("Rosa", TranslationError::Timeout { seconds: 30 }),
        );
        let engine: TestEngine = EnrichmentEngine::from_shared(
            Arc::clone(&client),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(LocalRecordStorage::new()),
            Arc::new(DefaultEnrichmentConfig::default()),
            Arc::new(NoOpProgressReporter::new()),
        );

        let first = engine.enrich(&path, &toxic()).await.unwrap();
        let second = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(first.failed_count(), 1);
        assert_eq!(second.service_calls, 1);
        assert_eq!(second.enriched_count, 1);
        assert_eq!(client.calls_for("Rosa"), 2);
        assert_eq!(read_collection(&path)[0].translated_name.as_deref(), Some("Róża"));
    }

    #[tokio::test]
    async fn test_enrich_within_run_shares_failed_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(&temp_dir, r#"[{"scientific_name": "Rosa"}]"#);
        let client = Arc::new(
            ScriptedTranslationClient::new()
                .with_translation("Rosa", "Róża")
                .with_error_once("Rosa", TranslationError::Timeout { seconds: 30 }),
        );
        let engine: TestEngine = EnrichmentEngine::from_shared(
            Arc::clone(&client),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(LocalRecordStorage::new()),
            Arc::new(DefaultEnrichmentConfig::default()),
            Arc::new(NoOpProgressReporter::new()),
        );
        let inflight = Arc::new(InflightLookups::new());

        engine
            .enrich_within_run(&path, &toxic(), Arc::clone(&inflight))
            .await
            .unwrap();
        let second = engine
            .enrich_within_run(&path, &toxic(), inflight)
            .await
            .unwrap();

        // 同じ実行内では失敗結果を共有する
        assert_eq!(second.failed_count(), 1);
        assert_eq!(second.service_calls, 0);
        assert_eq!(client.calls_for("Rosa"), 1);
    }

    #[tokio::test]
    async fn test_enrich_cached_absent_makes_no_call() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(&temp_dir, r#"[{"scientific_name": "Aloe vera"}]"#);
        let engine = engine(
            ScriptedTranslationClient::new(),
            MemoryCacheStore::with_entries([(CacheKey::new(toxic(), "Aloe vera"), CacheValue::Absent)]),
        );

        let summary = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(engine.client.call_count(), 0);
        assert_eq!(summary.unavailable_count(), 1);
        assert_eq!(summary.cache_hits, 1);
        assert_eq!(summary.service_calls, 0);
    }

    #[tokio::test]
    async fn test_enrich_skips_records_without_scientific_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(
            &temp_dir,
            r#"[{"name": "Unknown plant", "link": "https://x"}, {"name": "Blank", "scientific_name": "  "}]"#,
        );
        let engine = engine(ScriptedTranslationClient::new(), MemoryCacheStore::new());

        let summary = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(summary.skipped_count, 2);
        assert_eq!(summary.enriched_count, 0);
        assert!(summary.failures.is_empty());
        assert_eq!(engine.client.call_count(), 0);
        assert_eq!(read_collection(&path).len(), 2);
    }

    #[tokio::test]
    async fn test_enrich_completeness_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(
            &temp_dir,
            r#"[
                {"name": "A", "scientific_name": "Aloe vera"},
                {"name": "B"},
                {"name": "C", "scientific_name": "Ficus"},
                {"name": "D", "scientific_name": "Rosa"},
                {"name": "E", "scientific_name": "Aloe vera"}
            ]"#,
        );
        let client = ScriptedTranslationClient::new()
            .with_translation("Aloe vera", "Aloes")
            .with_not_found("Ficus")
            .with_error("Rosa", TranslationError::transport("reset"));
        let engine = engine(client, MemoryCacheStore::new());

        let summary = engine.enrich(&path, &toxic()).await.unwrap();
        let written = read_collection(&path);

        // 全レコードが元の順序で残る
        let names: Vec<&str> = written.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);

        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.enriched_count, 2);
        assert_eq!(summary.failed_count(), 2);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(
            summary.enriched_count + summary.failed_count() + summary.skipped_count,
            summary.total_records
        );
        assert_eq!(engine.client.calls_for("Aloe vera"), 1);
    }

    #[tokio::test]
    async fn test_enrich_preserves_unknown_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(
            &temp_dir,
            r#"[{"name": "Aloe", "link": "https://x", "scientific_name": "Aloe vera", "source_page": 3}]"#,
        );
        let engine = engine(
            ScriptedTranslationClient::new().with_translation("Aloe vera", "Aloes"),
            MemoryCacheStore::new(),
        );

        engine.enrich(&path, &toxic()).await.unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk[0]["source_page"], 3);
        assert_eq!(on_disk[0]["translated_name"], "Aloes");
    }

    #[tokio::test]
    async fn test_enrich_failed_record_keeps_previous_translation() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_collection(
            &temp_dir,
            r#"[{"scientific_name": "Aloe vera", "translated_name": "Stara nazwa"}]"#,
        );
        let engine = engine(
            ScriptedTranslationClient::new()
                .with_error("Aloe vera", TranslationError::Timeout { seconds: 30 }),
            MemoryCacheStore::new(),
        );

        let summary = engine.enrich(&path, &toxic()).await.unwrap();

        assert_eq!(summary.failed_count(), 1);
        assert_eq!(read_collection(&path)[0].translated_name.as_deref(), Some("Stara nazwa"));
    }

    #[tokio::test]
    async fn test_enrich_missing_collection_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(ScriptedTranslationClient::new(), MemoryCacheStore::new());

        let result = engine.enrich(&temp_dir.path().join("missing.json"), &toxic()).await;

        assert!(matches!(result, Err(EnrichmentError::CollectionIo { .. })));
    }

    #[tokio::test]
    async fn test_enrich_rejects_zero_workers() {
        let mut config = MockEnrichmentConfig::new();
        config.expect_max_concurrent_lookups().return_const(0usize);
        config.expect_channel_buffer_size().return_const(100usize);
        config.expect_enable_progress_reporting().return_const(false);

        let engine = EnrichmentEngine::new(
            ScriptedTranslationClient::new(),
            MemoryCacheStore::new(),
            LocalRecordStorage::new(),
            config,
            NoOpProgressReporter::new(),
        );

        let result = engine.enrich(Path::new("toxic.json"), &toxic()).await;

        assert!(matches!(result, Err(EnrichmentError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_enrich_with_mock_storage_and_reporter() {
        let mut storage = MockRecordStorage::new();
        storage.expect_load_records().times(1).returning(|_| {
            Ok(vec![
                Record::new("Aloe", "https://x").with_scientific_name("Aloe vera"),
                Record::new("Ficus", "https://y").with_scientific_name("Ficus"),
            ])
        });
        storage
            .expect_save_records()
            .withf(|path, records| {
                path == Path::new("toxic.json")
                    && records.len() == 2
                    && records[0].translated_name.as_deref() == Some("Aloes")
                    && records[1].translated_name.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut reporter = MockProgressReporter::new();
        reporter
            .expect_report_started()
            .withf(|category, total| category.as_str() == "toxic" && *total == 2)
            .times(1)
            .returning(|_, _| ());
        reporter.expect_report_progress().returning(|_, _| ());
        reporter.expect_report_failure().times(1).returning(|_, _| ());
        reporter
            .expect_report_completed()
            .with(mockall::predicate::eq(1), mockall::predicate::eq(1))
            .times(1)
            .returning(|_, _| ());

        let engine = EnrichmentEngine::new(
            ScriptedTranslationClient::new().with_translation("Aloe vera", "Aloes"),
            MemoryCacheStore::new(),
            storage,
            DefaultEnrichmentConfig::default(),
            reporter,
        );

        let summary = engine.enrich(Path::new("toxic.json"), &toxic()).await.unwrap();

        assert_eq!(summary.enriched_count, 1);
        assert_eq!(summary.unavailable_count(), 1);
    }

    #[tokio::test]
    async fn test_enrich_save_failure_is_fatal() {
        let mut storage = MockRecordStorage::new();
        storage
            .expect_load_records()
            .returning(|_| Ok(vec![Record::new("Aloe", "https://x")]));
        storage
            .expect_save_records()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let engine: TestEngine<MockRecordStorage> = EnrichmentEngine::new(
            ScriptedTranslationClient::new(),
            MemoryCacheStore::new(),
            storage,
            DefaultEnrichmentConfig::default(),
            NoOpProgressReporter::new(),
        );

        let result = engine.enrich(Path::new("toxic.json"), &toxic()).await;

        assert!(matches!(result, Err(EnrichmentError::CollectionIo { .. })));
    }
}
