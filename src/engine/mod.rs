// エンジン層 - 並列処理とオーケストレーション
// サービス層を組み合わせて高レベルな処理を提供

pub mod api;
pub mod collector;
pub mod consumer;
pub mod coordinator;
pub mod enrichment_engine;
mod pipeline; // パイプライン内部でのみ使用
pub mod producer;

// 公開API - 主要エンジンクラス
pub use api::{build_run_coordinator, DefaultRunCoordinator};
pub use coordinator::RunCoordinator;
pub use enrichment_engine::EnrichmentEngine;
