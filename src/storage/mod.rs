use crate::core::Record;
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use std::path::Path;

pub mod local;

/// JSON出力のインデント（既存のデータファイルと同じ4スペース）
const JSON_INDENT: &[u8] = b"    ";

/// 4スペースインデントのJSONへシリアライズ
pub fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// レコードコレクションの保存先を抽象化するトレイト
#[automock]
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// コレクション全体を読み込む
    async fn load_records(&self, path: &Path) -> Result<Vec<Record>>;

    /// コレクション全体を上書き保存する
    async fn save_records(&self, path: &Path, records: &[Record]) -> Result<()>;
}

// RecordStorage for Box<dyn RecordStorage>
#[async_trait]
impl RecordStorage for Box<dyn RecordStorage> {
    async fn load_records(&self, path: &Path) -> Result<Vec<Record>> {
        self.as_ref().load_records(path).await
    }

    async fn save_records(&self, path: &Path, records: &[Record]) -> Result<()> {
        self.as_ref().save_records(path, records).await
    }
}
