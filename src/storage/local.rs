use super::{to_indented_json, RecordStorage};
use crate::core::Record;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 同じディレクトリの一時ファイルへ書き込み、リネームで置き換える
///
/// 書き込み途中でプロセスが落ちても、対象ファイルは旧内容か新内容のどちらかになる。
pub async fn write_atomically(path: &Path, contents: Vec<u8>) -> std::io::Result<()> {
    let target: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
        temp.write_all(&contents)?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}

/// ローカルファイルシステム上のJSONコレクション
#[derive(Debug, Clone, Default)]
pub struct LocalRecordStorage;

impl LocalRecordStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordStorage for LocalRecordStorage {
    async fn load_records(&self, path: &Path) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read collection: {}", path.display()))?;

        let records: Vec<Record> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse collection: {}", path.display()))?;

        Ok(records)
    }

    async fn save_records(&self, path: &Path, records: &[Record]) -> Result<()> {
        let bytes = to_indented_json(records)?;
        write_atomically(path, bytes)
            .await
            .with_context(|| format!("Failed to write collection: {}", path.display()))
    }
}
