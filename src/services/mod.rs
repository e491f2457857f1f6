// サービス層 - 機能別のビジネスロジック
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod cache;
pub mod config;
pub mod monitoring;
pub mod processing;
pub mod translation;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use cache::{JsonCacheStore, MemoryCacheStore};
pub use config::{AppConfig, CollectionSpec, DefaultEnrichmentConfig};
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
pub use processing::{lookup_single_name, InflightLookups};
pub use translation::{ChatCompletionClient, ScriptedTranslationClient, TranslationSettings};
