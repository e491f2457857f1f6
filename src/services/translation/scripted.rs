// 応答を事前に設定する翻訳クライアント（テスト・開発用）

use crate::core::{TranslationClient, TranslationError, TranslationResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

type ScriptedResponse = Result<TranslationResult, TranslationError>;

/// 学名ごとに決められた応答を返すクライアント
///
/// 呼び出し履歴と同時実行数の最大値を記録する。
#[derive(Debug)]
pub struct ScriptedTranslationClient {
    responses: HashMap<String, ScriptedResponse>,
    /// 通常の応答より先に1回ずつ消費される応答
    queued: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    fallback: ScriptedResponse,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedTranslationClient {
    fn default() -> Self {
        Self {
            responses: HashMap::new(),
            queued: Mutex::new(HashMap::new()),
            fallback: Ok(TranslationResult::NotFound),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl ScriptedTranslationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, scientific_name: &str, translated: &str) -> Self {
        self.responses.insert(
            scientific_name.to_string(),
            Ok(TranslationResult::Translated(translated.to_string())),
        );
        self
    }

    pub fn with_not_found(mut self, scientific_name: &str) -> Self {
        self.responses
            .insert(scientific_name.to_string(), Ok(TranslationResult::NotFound));
        self
    }

    pub fn with_error(mut self, scientific_name: &str, error: TranslationError) -> Self {
        self.responses.insert(scientific_name.to_string(), Err(error));
        self
    }

    /// 次の1回だけエラーを返し、その後は通常の応答に戻る
    pub fn with_error_once(self, scientific_name: &str, error: TranslationError) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(scientific_name.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    /// 未設定の学名に対する応答（既定は NotFound）
    pub fn with_fallback(mut self, response: ScriptedResponse) -> Self {
        self.fallback = response;
        self
    }

    /// 1回の呼び出しにかかる時間
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 呼び出された学名（呼び出し順）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn calls_for(&self, scientific_name: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|name| name.as_str() == scientific_name)
            .count()
    }

    /// 同時に実行中だった呼び出し数の最大値
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationClient for ScriptedTranslationClient {
    async fn translate(&self, scientific_name: &str) -> Result<TranslationResult, TranslationError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(scientific_name.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(scientific_name)
            .and_then(VecDeque::pop_front);
        if let Some(response) = queued {
            return response;
        }

        self.responses
            .get(scientific_name)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
