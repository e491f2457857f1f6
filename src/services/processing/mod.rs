// 参照処理機能
// キャッシュ確認、翻訳サービス呼び出し、キャッシュへの書き込み

pub mod worker;

// 公開API
pub use worker::{lookup_single_name, InflightLookups};
