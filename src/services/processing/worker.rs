// Worker - 単一の学名に対する参照処理

use crate::core::{
    CacheKey, CacheStore, CacheValue, LookupOutcome, LookupResult, LookupSource,
    TranslationClient, TranslationError, TranslationResult, WorkItem,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OnceCell, Semaphore};

type SharedOutcome = (LookupOutcome, LookupSource);

/// 実行中の参照を (category, scientific_name) ごとに1つへまとめる
///
/// 実行スコープで保持され、失敗した参照も再試行されない。
#[derive(Debug, Default)]
pub struct InflightLookups {
    cells: Mutex<HashMap<CacheKey, Arc<OnceCell<SharedOutcome>>>>,
}

impl InflightLookups {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_for(&self, key: &CacheKey) -> Arc<OnceCell<SharedOutcome>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    /// 登録済みのキー数
    pub fn len(&self) -> usize {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 単一の学名を参照する
///
/// キャッシュ確認はセマフォの外、翻訳サービス呼び出しだけがパーミットを保持する。
pub async fn lookup_single_name<C, S>(
    client: &C,
    cache: &S,
    limiter: &Semaphore,
    inflight: &InflightLookups,
    item: &WorkItem,
) -> LookupResult
where
    C: TranslationClient + ?Sized,
    S: CacheStore + ?Sized,
{
    let key = CacheKey::new(item.category.clone(), item.scientific_name.clone());

    let (outcome, source) = match cache.lookup(&key).await {
        Some(CacheValue::Translated(text)) => {
            tracing::info!("キャッシュヒット: {} -> {}", item.scientific_name, text);
            (LookupOutcome::EnrichedWith(text), LookupSource::Cache)
        }
        Some(CacheValue::Absent) => {
            tracing::info!("キャッシュヒット（翻訳なし）: {}", item.scientific_name);
            (LookupOutcome::NoTranslationAvailable, LookupSource::Cache)
        }
        None => {
            let cell = inflight.cell_for(&key);
            let mut initialized_here = false;
            let shared = cell
                .get_or_init(|| {
                    initialized_here = true;
                    resolve_cache_miss(client, cache, limiter, &key)
                })
                .await
                .clone();

            if initialized_here {
                shared
            } else {
                tracing::debug!("実行中の参照結果を共有: {}", item.scientific_name);
                (shared.0, LookupSource::Coalesced)
            }
        }
    };

    LookupResult {
        index: item.index,
        scientific_name: item.scientific_name.clone(),
        outcome,
        source,
    }
}

/// キャッシュミス時：翻訳サービスを呼び、結果をキャッシュへ書き込む
async fn resolve_cache_miss<C, S>(
    client: &C,
    cache: &S,
    limiter: &Semaphore,
    key: &CacheKey,
) -> SharedOutcome
where
    C: TranslationClient + ?Sized,
    S: CacheStore + ?Sized,
{
    let response = {
        let _permit = match limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                let error = TranslationError::transport("同時実行制御が閉じられています");
                return (LookupOutcome::Failed(error), LookupSource::Service);
            }
        };
        tracing::info!("翻訳リクエスト送信: {}", key.scientific_name);
        client.translate(&key.scientific_name).await
    };

    let outcome = match response {
        Ok(TranslationResult::Translated(text)) => {
            write_through(cache, key, CacheValue::Translated(text.clone())).await;
            LookupOutcome::EnrichedWith(text)
        }
        Ok(TranslationResult::NotFound) => {
            write_through(cache, key, CacheValue::Absent).await;
            LookupOutcome::NoTranslationAvailable
        }
        Err(error) => {
            // 失敗はキャッシュしない（次回の実行で再試行）
            tracing::error!("翻訳エラー: {} - {}", key.scientific_name, error);
            LookupOutcome::Failed(error)
        }
    };

    (outcome, LookupSource::Service)
}

async fn write_through<S>(cache: &S, key: &CacheKey, value: CacheValue)
where
    S: CacheStore + ?Sized,
{
    if let Err(error) = cache.put(key, value).await {
        tracing::warn!(
            "キャッシュ書き込み失敗（レコードには反映）: {} - {}",
            key.scientific_name,
            error
        );
    }
}
