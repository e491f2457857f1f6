// 統合テスト用のヘルパー
#![allow(dead_code)]

use plant_enrichment::engine::{EnrichmentEngine, RunCoordinator};
use plant_enrichment::services::{
    DefaultEnrichmentConfig, JsonCacheStore, NoOpProgressReporter, ScriptedTranslationClient,
};
use plant_enrichment::storage::local::LocalRecordStorage;
use plant_enrichment::Record;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub type TestCoordinator = RunCoordinator<
    ScriptedTranslationClient,
    JsonCacheStore,
    LocalRecordStorage,
    DefaultEnrichmentConfig,
    NoOpProgressReporter,
>;

/// 1回の実行に必要なファイル一式
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn cache_path(&self) -> PathBuf {
        self.path("cache.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.path("failed_enrichment.json")
    }
}

/// ファイルキャッシュを読み込み、呼び出し履歴を確認できる形でコーディネーターを組み立てる
pub async fn build_coordinator(
    client: Arc<ScriptedTranslationClient>,
    cache_path: &Path,
) -> TestCoordinator {
    let cache = JsonCacheStore::load(cache_path).await.unwrap();
    RunCoordinator::new(EnrichmentEngine::from_shared(
        client,
        Arc::new(cache),
        Arc::new(LocalRecordStorage::new()),
        Arc::new(DefaultEnrichmentConfig::new(4).with_progress_reporting(false)),
        Arc::new(NoOpProgressReporter::new()),
    ))
}

pub fn read_records(path: &Path) -> Vec<Record> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
