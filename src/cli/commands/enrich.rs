use crate::core::{EnrichmentConfig, RunReport};
use crate::engine::build_run_coordinator;
use crate::services::config::{load_dotenv, AppConfig, CollectionSpec, DefaultEnrichmentConfig};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// enrich コマンドの引数
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub collections: Vec<CollectionSpec>,
    pub cache: PathBuf,
    pub failure_report: PathBuf,
    pub workers: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub model: Option<String>,
    pub target_language: Option<String>,
    pub base_url: Option<String>,
    pub quiet: bool,
}

impl EnrichOptions {
    /// 環境変数から読んだ設定にCLI引数を重ねる
    pub fn apply_to(&self, config: AppConfig) -> AppConfig {
        let mut config = config
            .with_collections(self.collections.clone())
            .with_cache_path(&self.cache)
            .with_failure_report_path(&self.failure_report)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries);

        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(language) = &self.target_language {
            config = config.with_target_language(language);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }
}

/// Enrich record collections with translated common names
pub async fn execute_enrich(options: EnrichOptions) -> Result<()> {
    load_dotenv();
    let config = options.apply_to(AppConfig::from_env()?);

    if !options.quiet {
        println!("🌿 植物名エンリッチツール - enrichコマンド");
        println!("⚙️  設定:");
        for spec in &config.collections {
            println!("   - {}: {}", spec.category, spec.path.display());
        }
        println!("   - キャッシュ: {}", config.cache_path.display());
        println!("   - 失敗レポート: {}", config.failure_report_path.display());
        println!("   - モデル: {} ({})", config.translation.model, config.translation.target_language);
    }

    let coordinator = build_run_coordinator(
        &config,
        DefaultEnrichmentConfig::new(options.workers),
        options.quiet,
    )
    .await?;

    if !options.quiet {
        let engine = coordinator.engine();
        println!("   - 並列数: {}", engine.config().max_concurrent_lookups());
        println!("💾 キャッシュ登録済み: {} 件", engine.cache().len().await);
    }

    let report = coordinator
        .run(&config.collections, &config.failure_report_path)
        .await?;

    if options.quiet {
        println!("{}", totals_line(&report));
    } else {
        print_run_report(&report, &config.failure_report_path);
    }

    Ok(())
}

/// 更新件数と失敗件数の1行サマリー（--quiet でも表示する）
fn totals_line(report: &RunReport) -> String {
    format!(
        "エンリッチ {} 件, 失敗 {} 件 (全 {} 件)",
        report.total_enriched(),
        report.total_failures,
        report.total_records()
    )
}

/// 実行サマリーを表示
fn print_run_report(report: &RunReport, failure_report_path: &Path) {
    let elapsed = report.finished_at - report.started_at;

    println!("\n✅ エンリッチ完了!");
    println!("📊 処理結果:");
    for summary in &report.collections {
        println!(
            "   - {}: {} 件中 {} 件エンリッチ, 失敗 {} 件 (翻訳なし {} 件), 学名なし {} 件",
            summary.category,
            summary.total_records,
            summary.enriched_count,
            summary.failed_count(),
            summary.unavailable_count(),
            summary.skipped_count
        );
        println!(
            "     API呼び出し {} 回, キャッシュヒット {} 件, {}ms",
            summary.service_calls, summary.cache_hits, summary.total_processing_time_ms
        );
    }
    println!(
        "   - 合計: {}, API呼び出し {} 回, {:.2}秒",
        totals_line(report),
        report.total_service_calls(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    if report.total_failures > 0 {
        println!(
            "⚠️  {}件のレコードをエンリッチできませんでした: {}",
            report.total_failures,
            failure_report_path.display()
        );
    }
}
