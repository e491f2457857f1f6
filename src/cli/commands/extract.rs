use crate::extraction::{ExtractionOutputs, HtmlPlantExtractor};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Extract toxic / non-toxic plant records from a saved listing page
pub async fn execute_extract(html: PathBuf, outputs: ExtractionOutputs, base_url: String) -> Result<()> {
    println!("🌿 植物名エンリッチツール - extractコマンド");
    println!("📄 入力ファイル: {}", html.display());

    let extractor = HtmlPlantExtractor::with_link_base_url(base_url)?;
    let plants = extractor
        .extract_file(&html, &outputs)
        .await
        .with_context(|| format!("Failed to extract plants from {}", html.display()))?;

    println!("\n✅ 抽出完了!");
    println!("   - 有毒: {} 件 -> {}", plants.toxic.len(), outputs.toxic.display());
    println!("   - 無毒: {} 件 -> {}", plants.safe.len(), outputs.safe.display());
    if !plants.failed.is_empty() {
        println!(
            "⚠️  {}件のエントリを解析できませんでした: {}",
            plants.failed.len(),
            outputs.failed.display()
        );
    }

    Ok(())
}
