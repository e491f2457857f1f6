// エンリッチメント処理のトレイト定義
// 全ての抽象化インターフェースを定義

use super::error::{EnrichmentResult, TranslationError};
use super::types::{CacheKey, CacheValue, Category, TranslationResult};
use async_trait::async_trait;
use mockall::automock;

/// ワーカープールの設定を抽象化するトレイト
#[automock]
pub trait EnrichmentConfig: Send + Sync {
    /// 同時に外部呼び出しできる最大数（ワーカー数）
    fn max_concurrent_lookups(&self) -> usize;

    /// チャンネルバッファサイズを取得
    fn channel_buffer_size(&self) -> usize;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// コレクション処理開始時の報告
    async fn report_started(&self, category: &Category, total_lookups: usize);

    /// 進捗更新の報告
    async fn report_progress(&self, completed: usize, total: usize);

    /// エンリッチ失敗時の報告
    async fn report_failure(&self, scientific_name: &str, reason: &str);

    /// コレクション処理完了時の報告
    async fn report_completed(&self, enriched: usize, failed: usize);
}

// ProgressReporter for Box<dyn ProgressReporter>
#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, category: &Category, total_lookups: usize) {
        self.as_ref().report_started(category, total_lookups).await
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        self.as_ref().report_progress(completed, total).await
    }

    async fn report_failure(&self, scientific_name: &str, reason: &str) {
        self.as_ref().report_failure(scientific_name, reason).await
    }

    async fn report_completed(&self, enriched: usize, failed: usize) {
        self.as_ref().report_completed(enriched, failed).await
    }
}

/// 外部翻訳サービスの境界
///
/// 実装は全ての呼び出し失敗を `TranslationError` に変換して返す。
/// パニックや他のエラー型で実行全体を中断させてはならない。
#[automock]
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// 学名から現地語の一般名を取得する
    async fn translate(&self, scientific_name: &str) -> Result<TranslationResult, TranslationError>;
}

/// 永続キャッシュの抽象化トレイト
///
/// `put` が返った時点で、その値は全ての後続 `lookup` から見える。
#[automock]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 未知なら None、既知なら Translated / Absent
    async fn lookup(&self, key: &CacheKey) -> Option<CacheValue>;

    /// 挿入（上書き）し、キャッシュ全体を永続化してから返る
    async fn put(&self, key: &CacheKey, value: CacheValue) -> EnrichmentResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[test]
    fn test_enrichment_config_mock() {
        let mut mock_config = MockEnrichmentConfig::new();

        mock_config.expect_max_concurrent_lookups().return_const(10usize);
        mock_config.expect_channel_buffer_size().return_const(100usize);
        mock_config.expect_enable_progress_reporting().return_const(false);

        let config_ref: &dyn EnrichmentConfig = &mock_config;
        assert_eq!(config_ref.max_concurrent_lookups(), 10);
        assert_eq!(config_ref.channel_buffer_size(), 100);
        assert!(!config_ref.enable_progress_reporting());
    }

    #[tokio::test]
    async fn test_translation_client_mock() {
        let mut mock_client = MockTranslationClient::new();

        mock_client
            .expect_translate()
            .with(eq("Aloe vera"))
            .times(1)
            .returning(|_| Ok(TranslationResult::Translated("Aloes".to_string())));

        let result = mock_client.translate("Aloe vera").await.unwrap();
        assert_eq!(result, TranslationResult::Translated("Aloes".to_string()));
    }

    #[tokio::test]
    async fn test_boxed_progress_reporter_delegates() {
        let mut mock_reporter = MockProgressReporter::new();

        mock_reporter
            .expect_report_started()
            .withf(|category, total| category.as_str() == "toxic" && *total == 3)
            .times(1)
            .returning(|_, _| ());
        mock_reporter
            .expect_report_completed()
            .with(eq(2), eq(1))
            .times(1)
            .returning(|_, _| ());

        let boxed: Box<dyn ProgressReporter> = Box::new(mock_reporter);
        boxed.report_started(&Category::from("toxic"), 3).await;
        boxed.report_completed(2, 1).await;
    }
}
