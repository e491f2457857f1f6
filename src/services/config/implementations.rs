// 設定管理の具象実装

use crate::core::EnrichmentConfig;

/// ワーカー数の既定値
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 10;

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultEnrichmentConfig {
    max_concurrent: usize,
    buffer_size: usize,
    enable_progress: bool,
}

impl DefaultEnrichmentConfig {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            ..Self::default()
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }
}

impl Default for DefaultEnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            buffer_size: 100,
            enable_progress: true,
        }
    }
}

impl EnrichmentConfig for DefaultEnrichmentConfig {
    fn max_concurrent_lookups(&self) -> usize {
        self.max_concurrent
    }

    fn channel_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}
