// 抽出機能
// 植物一覧ページ（HTML）-> カテゴリ別のレコードコレクション

pub mod html;

// 公開API
pub use html::{
    ExtractedPlants, ExtractionOutputs, FailedEntry, HtmlPlantExtractor, DEFAULT_LINK_BASE_URL,
};
