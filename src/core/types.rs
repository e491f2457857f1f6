// エンリッチメント処理に関連するデータ型定義

use super::error::TranslationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 植物レコード（抽出器が生成し、ドライバーが翻訳名を追記する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 必須フィールド（空でも常に出力する）
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_name: Option<String>,
    /// 未知のフィールドはそのまま保持する
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            other_names: None,
            scientific_name: None,
            family: None,
            translated_name: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_scientific_name(mut self, scientific_name: impl Into<String>) -> Self {
        self.scientific_name = Some(scientific_name.into());
        self
    }

    /// エンリッチメントのキー（空白のみの学名はキーなし扱い）
    pub fn enrichment_key(&self) -> Option<&str> {
        self.scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// レコード集合とキャッシュ名前空間の区分（"toxic", "safe" など）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// キャッシュキー (category, scientific_name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: Category,
    pub scientific_name: String,
}

impl CacheKey {
    pub fn new(category: Category, scientific_name: impl Into<String>) -> Self {
        Self {
            category,
            scientific_name: scientific_name.into(),
        }
    }
}

/// キャッシュ値：翻訳済み、または「調べたが翻訳なし」
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Translated(String),
    Absent,
}

impl CacheValue {
    /// 空文字列は Absent として扱う
    pub fn from_stored(stored: Option<String>) -> Self {
        match stored {
            Some(text) if !text.trim().is_empty() => Self::Translated(text),
            _ => Self::Absent,
        }
    }

    pub fn into_stored(self) -> Option<String> {
        match self {
            Self::Translated(text) => Some(text),
            Self::Absent => None,
        }
    }
}

/// 翻訳サービスの業務上の応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
    Translated(String),
    NotFound,
}

/// 1件の参照結果
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    EnrichedWith(String),
    NoTranslationAvailable,
    Failed(TranslationError),
}

/// 結果の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    /// この参照が翻訳サービスを呼び出した
    Service,
    /// 同じ実行内の別ワーカーの呼び出し結果を共有した
    Coalesced,
}

/// ワーカープールへ投入する作業単位
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// コレクション内のレコード位置
    pub index: usize,
    pub category: Category,
    pub scientific_name: String,
}

/// ワーカーから返される個別結果
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub index: usize,
    pub scientific_name: String,
    pub outcome: LookupOutcome,
    pub source: LookupSource,
}

/// 失敗理由のタグ（レポートファイルには出力しない）
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    NoTranslationAvailable,
    LookupFailed(TranslationError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTranslationAvailable => f.write_str("no translation available"),
            Self::LookupFailed(error) => write!(f, "lookup failed: {error}"),
        }
    }
}

/// エンリッチできなかったレコード
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRecord {
    pub category: Category,
    pub record: Record,
    pub reason: FailureReason,
}

/// 1コレクション分の処理サマリー
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentSummary {
    pub category: Category,
    /// 書き戻したコレクションのレコード数
    pub total_records: usize,
    pub enriched_count: usize,
    pub skipped_count: usize,
    pub failures: Vec<FailedRecord>,
    pub service_calls: usize,
    pub cache_hits: usize,
    pub total_processing_time_ms: u64,
}

impl EnrichmentSummary {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn unavailable_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.reason == FailureReason::NoTranslationAvailable)
            .count()
    }
}

/// 実行全体のレポート
#[derive(Debug, Clone)]
pub struct RunReport {
    pub collections: Vec<EnrichmentSummary>,
    pub total_failures: usize,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl RunReport {
    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.total_records).sum()
    }

    pub fn total_enriched(&self) -> usize {
        self.collections.iter().map(|c| c.enriched_count).sum()
    }

    pub fn total_service_calls(&self) -> usize {
        self.collections.iter().map(|c| c.service_calls).sum()
    }
}
