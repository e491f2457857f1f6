// キャッシュストアの具象実装

use crate::core::{CacheKey, CacheStore, CacheValue, EnrichmentError, EnrichmentResult};
use crate::storage::local::write_atomically;
use crate::storage::to_indented_json;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// ファイル上の表現: category -> scientific_name -> 翻訳名 | null
///
/// BTreeMapでキー順に出力し、同じ内容なら同じバイト列になる。
pub type CacheDocument = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// JSONファイルに永続化されるキャッシュ
///
/// 読み取りは並行、書き込みは書き込みロックで直列化される。
/// `put` は書き込みロックを保持したままファイル全体を書き直す。
#[derive(Debug)]
pub struct JsonCacheStore {
    path: PathBuf,
    document: RwLock<CacheDocument>,
}

impl JsonCacheStore {
    /// キャッシュファイルを読み込む
    ///
    /// ファイルがなければ空のキャッシュ、存在して解析できなければ `CacheCorrupt`。
    pub async fn load(path: impl Into<PathBuf>) -> EnrichmentResult<Self> {
        let path = path.into();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => CacheDocument::new(),
            Ok(content) => serde_json::from_str::<CacheDocument>(&content)
                .map_err(|e| EnrichmentError::cache_corrupt(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("キャッシュファイルがないため空のキャッシュで開始: {}", path.display());
                CacheDocument::new()
            }
            Err(e) => return Err(EnrichmentError::cache_io(&path, e)),
        };

        let entry_count: usize = document.values().map(BTreeMap::len).sum();
        tracing::info!("キャッシュ読み込み完了: {} 件 ({})", entry_count, path.display());

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    /// 全カテゴリの登録件数
    pub async fn len(&self) -> usize {
        self.document.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for JsonCacheStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheValue> {
        let document = self.document.read().await;
        document
            .get(key.category.as_str())
            .and_then(|names| names.get(&key.scientific_name))
            .map(|stored| CacheValue::from_stored(stored.clone()))
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> EnrichmentResult<()> {
        let mut document = self.document.write().await;
        document
            .entry(key.category.as_str().to_string())
            .or_default()
            .insert(key.scientific_name.clone(), value.into_stored());

        let bytes = to_indented_json(&*document)
            .map_err(|e| EnrichmentError::cache_io(&self.path, std::io::Error::other(e)))?;
        write_atomically(&self.path, bytes)
            .await
            .map_err(|e| EnrichmentError::cache_io(&self.path, e))?;

        Ok(())
    }
}

/// メモリ内キャッシュ（テスト用および開発用）
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, CacheValue>>,
    writes: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 事前に値を入れたキャッシュを作成
    pub fn with_entries(entries: impl IntoIterator<Item = (CacheKey, CacheValue)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
            writes: AtomicUsize::new(0),
        }
    }

    /// テスト用：`put` の呼び出し回数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// テスト用：登録件数
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheValue> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> EnrichmentResult<()> {
        self.entries.write().await.insert(key.clone(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
