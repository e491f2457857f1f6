use anyhow::Result;
use clap::Parser;

use plant_enrichment::cli::{
    execute_enrich, execute_extract, init_logging, Cli, Commands, EnrichOptions,
};
use plant_enrichment::extraction::ExtractionOutputs;

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Enrich {
            collections,
            cache,
            failure_report,
            workers,
            timeout_secs,
            max_retries,
            model,
            target_language,
            base_url,
            quiet,
        } => {
            execute_enrich(EnrichOptions {
                collections,
                cache,
                failure_report,
                workers,
                timeout_secs,
                max_retries,
                model,
                target_language,
                base_url,
                quiet,
            })
            .await
        }
        Commands::Extract {
            html,
            toxic_output,
            safe_output,
            failed_output,
            base_url,
        } => {
            let outputs = ExtractionOutputs {
                toxic: toxic_output,
                safe: safe_output,
                failed: failed_output,
            };
            execute_extract(html, outputs, base_url).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        tracing::error!("致命的エラー: {error:#}");
        eprintln!("❌ エラー: {error:#}");
        std::process::exit(1);
    }
}
