// 設定管理機能
// ワーカープール設定とアプリケーション設定

pub mod app;
pub mod implementations;

// 公開API
pub use app::{default_collections, load_dotenv, AppConfig, CollectionSpec};
pub use implementations::{DefaultEnrichmentConfig, DEFAULT_MAX_CONCURRENT_LOOKUPS};
