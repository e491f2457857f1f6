// 植物レコードのエンリッチメントパイプライン
//
// core      - トレイト、型、エラー定義
// services  - キャッシュ、翻訳クライアント、設定、進捗報告、単一参照処理
// storage   - レコードコレクションの保存先
// engine    - Producer-Consumer パイプライン、ドライバー、コーディネーター
// extraction - HTML一覧ページからのレコード抽出
// cli       - コマンドライン引数とコマンド

pub mod cli;
pub mod core;
pub mod engine;
pub mod extraction;
pub mod services;
pub mod storage;

// 公開API
pub use crate::core::{
    CacheStore, Category, EnrichmentConfig, EnrichmentError, EnrichmentResult, EnrichmentSummary,
    ProgressReporter, Record, RunReport, TranslationClient, TranslationError, TranslationResult,
};
pub use engine::{EnrichmentEngine, RunCoordinator};
