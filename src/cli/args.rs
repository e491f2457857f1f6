use crate::services::config::CollectionSpec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant_enrichment")]
#[command(about = "Extract plant-safety records and enrich them with localized common names")]
#[command(version)]
pub struct Cli {
    /// Write log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enrich record collections with translated common names
    Enrich {
        /// Collection to enrich, as CATEGORY=PATH (repeatable; default toxic=toxic.json safe=safe.json)
        #[arg(short, long = "collection", value_name = "CATEGORY=PATH")]
        collections: Vec<CollectionSpec>,

        /// Translation cache file
        #[arg(long, default_value = "cache.json")]
        cache: PathBuf,

        /// Consolidated failure report file
        #[arg(long, default_value = "failed_enrichment.json")]
        failure_report: PathBuf,

        /// Number of concurrent lookups
        #[arg(short, long, default_value = "10")]
        workers: usize,

        /// Timeout for a single translation request, in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Retries for timeouts, transport errors, 429 and 5xx responses
        #[arg(long, default_value = "2")]
        max_retries: u32,

        /// Model name sent to the chat completion endpoint
        #[arg(long)]
        model: Option<String>,

        /// Language of the common names
        #[arg(long)]
        target_language: Option<String>,

        /// Base URL of the chat completion API (overrides the environment)
        #[arg(long)]
        base_url: Option<String>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Extract toxic / non-toxic plant records from a saved listing page
    Extract {
        /// Saved HTML page
        #[arg(default_value = "website.html")]
        html: PathBuf,

        /// Output file for toxic plants
        #[arg(long, default_value = "toxic.json")]
        toxic_output: PathBuf,

        /// Output file for non-toxic plants
        #[arg(long, default_value = "safe.json")]
        safe_output: PathBuf,

        /// Output file for entries that could not be parsed
        #[arg(long, default_value = "failed.json")]
        failed_output: PathBuf,

        /// Site URL prepended to relative plant links
        #[arg(long, default_value = "https://www.aspca.org")]
        base_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_defaults() {
        let cli = Cli::try_parse_from(["plant_enrichment", "enrich"]).unwrap();

        match cli.command {
            Commands::Enrich {
                collections,
                cache,
                failure_report,
                workers,
                timeout_secs,
                max_retries,
                quiet,
                ..
            } => {
                assert!(collections.is_empty());
                assert_eq!(cache, PathBuf::from("cache.json"));
                assert_eq!(failure_report, PathBuf::from("failed_enrichment.json"));
                assert_eq!(workers, 10);
                assert_eq!(timeout_secs, 30);
                assert_eq!(max_retries, 2);
                assert!(!quiet);
            }
            Commands::Extract { .. } => panic!("expected enrich"),
        }
    }

    #[test]
    fn test_enrich_collections() {
        let cli = Cli::try_parse_from([
            "plant_enrichment",
            "--log-file",
            "enrichment.log",
            "enrich",
            "-c",
            "toxic=data/toxic.json",
            "--collection",
            "safe=data/safe.json",
            "--workers",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.log_file, Some(PathBuf::from("enrichment.log")));
        let Commands::Enrich { collections, workers, .. } = cli.command else {
            panic!("expected enrich");
        };
        assert_eq!(
            collections,
            vec![
                CollectionSpec::new("toxic", "data/toxic.json"),
                CollectionSpec::new("safe", "data/safe.json"),
            ]
        );
        assert_eq!(workers, 4);
    }

    #[test]
    fn test_enrich_rejects_malformed_collection() {
        let result = Cli::try_parse_from(["plant_enrichment", "enrich", "--collection", "toxic.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::try_parse_from(["plant_enrichment", "extract"]).unwrap();

        let Commands::Extract { html, toxic_output, failed_output, base_url, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(html, PathBuf::from("website.html"));
        assert_eq!(toxic_output, PathBuf::from("toxic.json"));
        assert_eq!(failed_output, PathBuf::from("failed.json"));
        assert_eq!(base_url, "https://www.aspca.org");
    }
}
