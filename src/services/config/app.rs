// アプリケーション設定
// 環境変数（.env を含む）から読み込み、CLI引数で上書きする

use crate::core::{Category, EnrichmentError, EnrichmentResult};
use crate::services::translation::TranslationSettings;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// APIキーを探す環境変数（先頭から順に）
pub const API_KEY_VARIABLES: [&str; 2] = ["TRANSLATION_API_KEY", "DEEPSEEK_API_KEY"];

/// ベースURLを探す環境変数（先頭から順に）
pub const BASE_URL_VARIABLES: [&str; 2] = ["TRANSLATION_API_BASE_URL", "DEEPSEEK_API_BASE_URL"];

pub const DEFAULT_CACHE_PATH: &str = "cache.json";
pub const DEFAULT_FAILURE_REPORT_PATH: &str = "failed_enrichment.json";

/// 処理対象のコレクション（カテゴリとファイルパス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub category: Category,
    pub path: PathBuf,
}

impl CollectionSpec {
    pub fn new(category: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            category: Category::new(category),
            path: path.into(),
        }
    }
}

/// `CATEGORY=PATH` 形式
impl FromStr for CollectionSpec {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (category, path) = value
            .split_once('=')
            .ok_or_else(|| format!("expected CATEGORY=PATH, got '{value}'"))?;
        let category = category.trim();
        let path = path.trim();

        if category.is_empty() || path.is_empty() {
            return Err(format!("expected CATEGORY=PATH, got '{value}'"));
        }

        Ok(Self::new(category, path))
    }
}

/// カレントディレクトリの .env を環境変数へ読み込む（既存の値は上書きしない）
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => tracing::info!("環境変数ファイルを読み込みました: {}", path.display()),
        Err(e) => tracing::debug!(".env が見つからないか読み込めません: {}", e),
    }
}

/// 既定のコレクション: toxic と safe
pub fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new("toxic", "toxic.json"),
        CollectionSpec::new("safe", "safe.json"),
    ]
}

/// 実行全体の設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub translation: TranslationSettings,
    pub collections: Vec<CollectionSpec>,
    pub cache_path: PathBuf,
    pub failure_report_path: PathBuf,
}

impl AppConfig {
    /// プロセスの環境変数から構築する
    pub fn from_env() -> EnrichmentResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数参照関数から構築する
    pub fn from_lookup<F>(lookup: F) -> EnrichmentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let api_key = first_set(&API_KEY_VARIABLES)
            .ok_or_else(|| EnrichmentError::missing_credentials(API_KEY_VARIABLES.join(" / ")))?;

        let mut translation = TranslationSettings {
            api_key,
            ..TranslationSettings::default()
        };
        if let Some(base_url) = first_set(&BASE_URL_VARIABLES) {
            translation.base_url = base_url;
        }

        Ok(Self {
            translation,
            collections: default_collections(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            failure_report_path: PathBuf::from(DEFAULT_FAILURE_REPORT_PATH),
        })
    }

    pub fn with_collections(mut self, collections: Vec<CollectionSpec>) -> Self {
        if !collections.is_empty() {
            self.collections = collections;
        }
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_failure_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_report_path = path.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.translation.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.translation.model = model.into();
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.translation.target_language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.translation.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.translation.max_retries = max_retries;
        self
    }

    /// 設定値の妥当性チェック
    pub fn validate(&self) -> EnrichmentResult<()> {
        if self.collections.is_empty() {
            return Err(EnrichmentError::configuration("コレクションが指定されていません"));
        }
        if self.translation.timeout.is_zero() {
            return Err(EnrichmentError::configuration("タイムアウトは0より大きくしてください"));
        }
        if self.translation.base_url.trim().is_empty() {
            return Err(EnrichmentError::configuration("ベースURLが空です"));
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &self.collections {
            if !seen.insert(&spec.path) {
                return Err(EnrichmentError::configuration(format!(
                    "同じコレクションファイルが複数回指定されています: {}",
                    spec.path.display()
                )));
            }
        }

        Ok(())
    }
}
