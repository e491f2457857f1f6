// キャッシュ機能
// (category, scientific_name) -> 翻訳名 | 翻訳なし の永続キャッシュ

pub mod implementations;

// 公開API
pub use implementations::{CacheDocument, JsonCacheStore, MemoryCacheStore};
