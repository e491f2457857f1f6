// Custom error types for the enrichment pipeline
// エンリッチメント処理専用のカスタムエラー型定義

use std::path::PathBuf;
use thiserror::Error;

/// 実行全体に関わるエラー型
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("キャッシュ破損エラー: {path} - {source}")]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("キャッシュ入出力エラー: {path} - {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("コレクション入出力エラー: {path} - {source}")]
    CollectionIo {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("認証情報がありません: 環境変数 {variable} を設定してください")]
    MissingCredentials { variable: String },

    #[error("チャンネルエラー: {message}")]
    Channel { message: String },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// エンリッチメント処理用のResult型エイリアス
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

impl EnrichmentError {
    /// キャッシュ破損エラーの作成
    pub fn cache_corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheCorrupt {
            path: path.into(),
            source,
        }
    }

    /// キャッシュ入出力エラーの作成
    pub fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheIo {
            path: path.into(),
            source,
        }
    }

    /// コレクション入出力エラーの作成
    pub fn collection_io(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::CollectionIo {
            path: path.into(),
            source,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 認証情報欠如エラーの作成
    pub fn missing_credentials(variable: impl Into<String>) -> Self {
        Self::MissingCredentials {
            variable: variable.into(),
        }
    }

    /// チャンネルエラーの作成
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CacheCorrupt { .. } | Self::MissingCredentials { .. } => ErrorSeverity::Critical,
            Self::Configuration { .. } | Self::CollectionIo { .. } => ErrorSeverity::High,
            Self::CacheIo { .. } => ErrorSeverity::High,
            Self::Channel { .. } | Self::Task { .. } => ErrorSeverity::Medium,
        }
    }

    /// エラーが回復可能かどうかを判定
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CacheCorrupt { .. } | Self::MissingCredentials { .. } => false,
            Self::Configuration { .. } => false,
            Self::CacheIo { .. } | Self::CollectionIo { .. } => true,
            Self::Channel { .. } | Self::Task { .. } => true,
        }
    }
}

impl From<tokio::task::JoinError> for EnrichmentError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::task(source)
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - 実行停止レベル
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// 1件の翻訳呼び出しのエラー（ワーカープール境界で結果値に変換される）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("タイムアウト: {seconds}秒以内に応答がありません")]
    Timeout { seconds: u64 },

    #[error("通信エラー: {message}")]
    Transport { message: String },

    #[error("HTTPエラー: ステータス {status} - {body}")]
    HttpStatus { status: u16, body: String },

    #[error("不正な応答: {message}")]
    MalformedResponse { message: String },

    #[error("不正な入力: {message}")]
    InvalidInput { message: String },
}

impl TranslationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 再試行すべきエラーかどうか（タイムアウト・通信・429・5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse { .. } | Self::InvalidInput { .. } => false,
        }
    }
}

/// HTMLからのレコード抽出エラー
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("ファイル入出力エラー: {path} - {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("正規表現エラー: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON出力エラー: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
