// 植物一覧ページ（HTML）からレコードを抽出する

use crate::core::{ExtractionError, Record};
use crate::storage::{local::write_atomically, to_indented_json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LINK_BASE_URL: &str = "https://www.aspca.org";

const TOXIC_SECTION_PATTERN: &str = r#"(?s)h2>Plants Toxic to Cats</h2>.*?<div class="view-content">(.*?)<div class="attachment attachment-after">"#;
const SAFE_SECTION_PATTERN: &str =
    r#"(?s)h2>Plants Non-Toxic to Cats</h2>.*?<div class="view-content">(.*?)<footer"#;
const ROW_PATTERN: &str = r#"(?s)<div class="views-row.*?">(.*?)</div>"#;
const LINK_PATTERN: &str = r#"<a href="([^"]+)">([^<]+)</a>"#;
const OTHER_NAMES_PATTERN: &str = r"\(([^)]+)\)";
const SCIENTIFIC_NAME_PATTERN: &str = r"<b>Scientific Names:</b>\s*<i>([^<]+)</i>";
const FAMILY_PATTERN: &str = r"<b>Family:</b>\s*([^<]+)</span>";

/// 解析できなかったエントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntry {
    pub html: String,
    pub error: String,
}

/// 抽出結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPlants {
    pub toxic: Vec<Record>,
    pub safe: Vec<Record>,
    pub failed: Vec<FailedEntry>,
}

/// 出力ファイルの場所
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutputs {
    pub toxic: PathBuf,
    pub safe: PathBuf,
    pub failed: PathBuf,
}

impl Default for ExtractionOutputs {
    fn default() -> Self {
        Self {
            toxic: PathBuf::from("toxic.json"),
            safe: PathBuf::from("safe.json"),
            failed: PathBuf::from("failed.json"),
        }
    }
}

/// 正規表現ベースの抽出器
#[derive(Debug, Clone)]
pub struct HtmlPlantExtractor {
    link_base_url: String,
    toxic_section: Regex,
    safe_section: Regex,
    row: Regex,
    link: Regex,
    other_names: Regex,
    scientific_name: Regex,
    family: Regex,
}

impl HtmlPlantExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Self::with_link_base_url(DEFAULT_LINK_BASE_URL)
    }

    /// リンクの前に付けるサイトURLを指定して作成
    pub fn with_link_base_url(base_url: impl Into<String>) -> Result<Self, ExtractionError> {
        Ok(Self {
            link_base_url: base_url.into().trim_end_matches('/').to_string(),
            toxic_section: Regex::new(TOXIC_SECTION_PATTERN)?,
            safe_section: Regex::new(SAFE_SECTION_PATTERN)?,
            row: Regex::new(ROW_PATTERN)?,
            link: Regex::new(LINK_PATTERN)?,
            other_names: Regex::new(OTHER_NAMES_PATTERN)?,
            scientific_name: Regex::new(SCIENTIFIC_NAME_PATTERN)?,
            family: Regex::new(FAMILY_PATTERN)?,
        })
    }

    /// 1件分のエントリを解析する
    pub fn parse_entry(&self, entry_html: &str) -> Result<Record, String> {
        let link_match = self
            .link
            .captures(entry_html)
            .ok_or_else(|| format!("Could not find link in {entry_html}"))?;

        let (Some(whole), Some(href), Some(name)) =
            (link_match.get(0), link_match.get(1), link_match.get(2))
        else {
            return Err(format!("Could not find link in {entry_html}"));
        };

        let mut record = Record::new(
            name.as_str(),
            format!("{}{}", self.link_base_url, href.as_str()),
        );

        // 残りの情報はリンクの後ろにある
        let remaining = &entry_html[whole.end()..];
        record.other_names = first_group(&self.other_names, remaining);
        record.scientific_name = first_group(&self.scientific_name, remaining);
        record.family = first_group(&self.family, remaining);

        Ok(record)
    }

    /// セクション内の全エントリを解析する
    fn parse_section(&self, section_html: &str, records: &mut Vec<Record>, failed: &mut Vec<FailedEntry>) {
        for caps in self.row.captures_iter(section_html) {
            let Some(entry) = caps.get(1) else { continue };
            match self.parse_entry(entry.as_str()) {
                Ok(record) => records.push(record),
                Err(error) => failed.push(FailedEntry {
                    html: entry.as_str().trim().to_string(),
                    error,
                }),
            }
        }
    }

    /// ページ全体から有毒・無毒の植物一覧を抽出する
    pub fn extract(&self, html: &str) -> ExtractedPlants {
        // 名前付き・数値エンティティを全てデコードしてから解析する
        let html = html_escape::decode_html_entities(html);
        let mut plants = ExtractedPlants::default();

        match self.toxic_section.captures(&html).and_then(|caps| caps.get(1)) {
            Some(section) => self.parse_section(section.as_str(), &mut plants.toxic, &mut plants.failed),
            None => tracing::warn!("有毒植物セクションが見つかりません"),
        }

        match self.safe_section.captures(&html).and_then(|caps| caps.get(1)) {
            Some(section) => self.parse_section(section.as_str(), &mut plants.safe, &mut plants.failed),
            None => tracing::warn!("無毒植物セクションが見つかりません"),
        }

        tracing::info!(
            "抽出完了: 有毒 {} 件, 無毒 {} 件, 失敗 {} 件",
            plants.toxic.len(),
            plants.safe.len(),
            plants.failed.len()
        );
        plants
    }

    /// HTMLファイルを読み込み、3つのJSONファイルへ書き出す
    pub async fn extract_file(
        &self,
        input: &Path,
        outputs: &ExtractionOutputs,
    ) -> Result<ExtractedPlants, ExtractionError> {
        let html = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| ExtractionError::io(input, e))?;

        let plants = self.extract(&html);

        write_json(&outputs.toxic, &plants.toxic).await?;
        write_json(&outputs.safe, &plants.safe).await?;
        write_json(&outputs.failed, &plants.failed).await?;

        Ok(plants)
    }
}

fn first_group(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExtractionError> {
    let bytes = to_indented_json(value)?;
    write_atomically(path, bytes)
        .await
        .map_err(|e| ExtractionError::io(path, e))
}
