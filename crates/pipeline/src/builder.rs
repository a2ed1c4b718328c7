use crate::city::{assemble, City};
use crate::config::CityConfig;
use crate::error::{CityError, Result};
use crate::scanner::{FileScanner, ScanOptions};
use crate::scheduler::Scheduler;
use crate::stats::RunStats;
use codecity_analyzer::{Analyzer, ComplexityBackend};
use codecity_layout::{canvas_side, squarify, VisualEncoder};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs scan → analyze → layout → assemble for one source root
pub struct CityBuilder {
    config: CityConfig,
    backend: Option<Arc<dyn ComplexityBackend>>,
    timeout: Option<Duration>,
}

impl CityBuilder {
    pub fn new(config: CityConfig) -> Self {
        Self {
            config,
            backend: None,
            timeout: None,
        }
    }

    /// Score every language with `backend` instead of the bundled ones
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn ComplexityBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Override `timeout_secs` with a finer-grained budget
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn analyzer(&self) -> Analyzer {
        let analyzer = match &self.backend {
            Some(backend) => Analyzer::with_backend(Arc::clone(backend)),
            None => Analyzer::new(),
        };
        analyzer.with_max_bytes(self.config.max_file_bytes)
    }

    /// Validate inputs, then run the whole pipeline under the time budget
    pub async fn build(&self, root: impl AsRef<Path>) -> Result<City> {
        let started = Instant::now();
        let root = root.as_ref();

        self.config.validate().map_err(CityError::InvalidConfig)?;
        let encoder = self
            .config
            .encoder()
            .map_err(|e| CityError::InvalidConfig(e.to_string()))?;
        if !root.is_dir() {
            return Err(CityError::InvalidSourceRoot(root.display().to_string()));
        }

        let budget = self.timeout.unwrap_or_else(|| self.config.timeout());
        let mut city = tokio::time::timeout(budget, self.run(root, &encoder))
            .await
            .map_err(|_| CityError::Timeout(budget))??;

        city.stats.time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "City built: {} tiles on a {side}x{side} canvas in {} ms",
            city.tiles.len(),
            city.stats.time_ms,
            side = city.stats.canvas_side
        );
        Ok(city)
    }

    async fn run(&self, root: &Path, encoder: &VisualEncoder) -> Result<City> {
        log::info!("Building city for {}", root.display());
        let scanner = FileScanner::new(root, ScanOptions::from_config(&self.config));
        let scan = tokio::task::spawn_blocking(move || scanner.scan())
            .await
            .map_err(|e| CityError::IoError(std::io::Error::other(e)))?;
        if scan.files.is_empty() {
            return Err(CityError::NoSourceFiles(root.display().to_string()));
        }

        let mut stats = RunStats {
            files_found: scan.files.len(),
            truncated: scan.truncated,
            ..RunStats::default()
        };

        let scheduler = Scheduler::new(Arc::new(self.analyzer()), self.config.effective_workers());
        let report = scheduler.run(scan.files).await?;

        // Completion order varies between runs; path order keeps the layout reproducible.
        let mut metrics = report.metrics;
        metrics.sort_by(|a, b| a.path.cmp(&b.path));
        stats.files_dropped = report.dropped.len();
        for metric in &metrics {
            stats.add_file(metric);
        }

        let side = canvas_side(metrics.len(), self.config.area_scale, self.config.area_floor);
        #[allow(clippy::cast_precision_loss)]
        let sizes: Vec<f64> = metrics.iter().map(|m| m.line_count as f64).collect();
        let rects = squarify(&sizes, side)?;
        let tiles = assemble(&metrics, &rects, encoder)?;
        stats.canvas_side = side;

        Ok(City { tiles, stats })
    }
}

/// Build a city with the bundled complexity backends
pub async fn build_city(root: impl AsRef<Path>, config: &CityConfig) -> Result<City> {
    CityBuilder::new(config.clone()).build(root).await
}
