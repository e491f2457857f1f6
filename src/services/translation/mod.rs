// 翻訳サービス
// 学名 -> 目的言語の一般名

pub mod client;
pub mod scripted;

// 公開API
pub use client::{
    normalize_response, system_prompt, ChatCompletionClient, TranslationSettings,
    NOT_FOUND_SENTINEL,
};
pub use scripted::ScriptedTranslationClient;
