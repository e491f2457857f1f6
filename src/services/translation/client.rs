// OpenAI互換 chat/completions API を使った翻訳クライアント

use crate::core::{TranslationClient, TranslationError, TranslationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// サービスが「翻訳なし」を示す応答
pub const NOT_FOUND_SENTINEL: &str = "not found";

/// エラー本文をログに残す最大文字数
const MAX_ERROR_BODY_CHARS: usize = 200;

/// 翻訳クライアントの設定
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub target_language: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            target_language: "Polish".to_string(),
            temperature: 0.1,
            max_tokens: 60,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// システムプロンプトを組み立てる
pub fn system_prompt(target_language: &str) -> String {
    format!(
        "You are a script that translates scientific plant names to {target_language}. \
         For each request, return a simple common {target_language} name. No extra words. \
         If there is no common {target_language} name, return exactly: {NOT_FOUND_SENTINEL}"
    )
}

/// サービス応答を正規化する
///
/// 前後の空白と引用符を取り除き、空文字列か `not found`（大文字小文字無視）は `NotFound`。
pub fn normalize_response(raw: &str) -> TranslationResult {
    let trimmed = raw
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '„' | '`'))
        .trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_FOUND_SENTINEL) {
        TranslationResult::NotFound
    } else {
        TranslationResult::Translated(trimmed.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// chat/completions エンドポイントを呼ぶ翻訳クライアント
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    settings: TranslationSettings,
}

impl ChatCompletionClient {
    pub fn new(settings: TranslationSettings) -> Result<Self, TranslationError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| TranslationError::transport(format!("HTTPクライアント作成エラー: {e}")))?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &TranslationSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// 1件分のリクエストボディ
    pub fn build_request(&self, scientific_name: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(&self.settings.target_language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: scientific_name.to_string(),
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    fn classify(&self, error: reqwest::Error) -> TranslationError {
        if error.is_timeout() {
            TranslationError::Timeout {
                seconds: self.settings.timeout.as_secs(),
            }
        } else if error.is_decode() {
            TranslationError::malformed(error.to_string())
        } else {
            TranslationError::transport(error.to_string())
        }
    }

    /// 1回分の呼び出し（再試行なし）
    async fn request_once(&self, scientific_name: &str) -> Result<TranslationResult, TranslationError> {
        let request = self.build_request(scientific_name);

        let call = async {
            let response = self
                .http
                .post(self.endpoint())
                .bearer_auth(&self.settings.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| self.classify(e))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| self.classify(e))?;

            if !status.is_success() {
                return Err(TranslationError::HttpStatus {
                    status: status.as_u16(),
                    body: truncate_body(&body),
                });
            }

            let parsed: ChatResponse = serde_json::from_str(&body)
                .map_err(|e| TranslationError::malformed(format!("JSON解析エラー: {e}")))?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| TranslationError::malformed("choicesが空です"))?
                .message
                .content
                .ok_or_else(|| TranslationError::malformed("contentがありません"))?;

            Ok(content)
        };

        let content = tokio::time::timeout(self.settings.timeout, call)
            .await
            .map_err(|_| TranslationError::Timeout {
                seconds: self.settings.timeout.as_secs(),
            })??;

        tracing::info!("応答受信: {} -> {}", scientific_name, content.trim());
        Ok(normalize_response(&content))
    }
}

#[async_trait]
impl TranslationClient for ChatCompletionClient {
    async fn translate(&self, scientific_name: &str) -> Result<TranslationResult, TranslationError> {
        let scientific_name = scientific_name.trim();
        if scientific_name.is_empty() {
            return Err(TranslationError::invalid_input("学名が空です"));
        }

        let mut attempt: u32 = 0;
        loop {
            match self.request_once(scientific_name).await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "翻訳リクエスト再試行 {}/{}: {} - {}",
                        attempt,
                        self.settings.max_retries,
                        scientific_name,
                        error
                    );
                    tokio::time::sleep(self.settings.retry_backoff * attempt).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
