use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::app_config::Config;
use crate::database::{DatabaseConnection, Repository};
use crate::database::models::CacheStats;
use crate::document::{DocumentStore, JsonDrawingStore};
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::pipeline::{
    CancellationToken, Extraction, PipelineRun, ProgressEvent, RunOptions, RunSummary,
    extract_text_items, purge_invalid_text,
};
use crate::providers::probe_endpoint;
use crate::translation::TranslationService;

// @module: Application controller for drawing translation

/// Progress bar currently drawn, so log lines can be printed around it
static ACTIVE_BAR: Lazy<Mutex<Option<ProgressBar>>> = Lazy::new(|| Mutex::new(None));

fn set_active_bar(bar: Option<ProgressBar>) {
    *ACTIVE_BAR.lock() = bar;
}

/// Run `f` with the active progress bar hidden
pub fn suspend_progress<F: FnOnce() -> R, R>(f: F) -> R {
    let bar = ACTIVE_BAR.lock().clone();
    match bar {
        Some(bar) => bar.suspend(f),
        None => f(),
    }
}

/// Main application controller for drawing translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_store(&self) -> Result<JsonDrawingStore, PipelineError> {
        JsonDrawingStore::from_labels(
            &self.config.document.input_encodings,
            &self.config.document.output_encoding,
        )
        .map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Probe the backend before any drawing is touched
    pub async fn check_connectivity(&self, service: &TranslationService) -> Result<(), PipelineError> {
        let settings = &self.config.connectivity;
        if !settings.enabled {
            debug!("Connectivity check disabled");
            return Ok(());
        }

        let timeout = Duration::from_secs(settings.timeout_secs);
        let provider = service.provider();
        let result = match &settings.probe_url {
            Some(url) => probe_endpoint(url, timeout).await,
            None => provider.test_connection(timeout).await,
        };
        result.map_err(|e| PipelineError::BackendUnreachable(format!("{}: {}", provider.name(), e)))?;
        info!("{} is reachable", provider.name());
        Ok(())
    }

    /// Translate a drawing, or every drawing below a folder
    pub async fn run(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        write_report: bool,
    ) -> Result<Vec<RunSummary>> {
        let service = TranslationService::new(&self.config)?;
        let store = self.build_store()?;
        self.check_connectivity(&service).await?;

        let start_time = Instant::now();
        let summaries = if input.is_dir() {
            self.run_folder(&service, &store, input, output_dir, write_report)
                .await?
        } else if input.is_file() {
            let multi_progress = MultiProgress::new();
            vec![
                self.run_file(&service, &store, input, output_dir, write_report, &multi_progress)
                    .await?,
            ]
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        };

        let (hits, misses, hit_rate) = service.cache().stats();
        debug!(
            "Cache: {} hit(s), {} miss(es), {:.0}% hit rate",
            hits,
            misses,
            hit_rate * 100.0
        );
        info!(
            "Finished {} drawing(s) in {}",
            summaries.len(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(summaries)
    }

    /// Run the pipeline on one drawing with a progress bar
    async fn run_file(
        &self,
        service: &TranslationService,
        store: &JsonDrawingStore,
        input: &Path,
        output_dir: Option<&Path>,
        write_report: bool,
        multi_progress: &MultiProgress,
    ) -> Result<RunSummary> {
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        FileManager::ensure_dir(&output_dir)?;

        let target = self.config.pair.config().target_code;
        let output = FileManager::generate_output_path(input, &output_dir, target);
        let report = write_report.then(|| FileManager::report_path(&output));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let mut run = PipelineRun::new(
            store.clone(),
            service.clone(),
            RunOptions::from_config(&self.config),
        )
        .with_progress(tx)
        .with_cancellation(token.clone());

        let task_input = input.to_path_buf();
        let task_output = output.clone();
        let handle = tokio::spawn(async move {
            run.run(&task_input, &task_output, report.as_deref()).await
        });

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} labels ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        set_active_bar(Some(progress_bar.clone()));

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(ProgressEvent::StateChanged { state, .. }) => {
                        progress_bar.set_message(state.to_string());
                    }
                    Some(ProgressEvent::ItemsFound { total, .. }) => {
                        progress_bar.set_length(total as u64);
                    }
                    Some(ProgressEvent::ItemDone { original, outcome, .. }) => {
                        progress_bar.inc(1);
                        progress_bar.set_message(format!("{} ({})", original.chars().take(20).collect::<String>(), outcome));
                    }
                    Some(ProgressEvent::Finished(summary)) => {
                        debug!("Run {} finished as {}", summary.run_id, summary.state);
                    }
                    None => break,
                },
                _ = &mut ctrl_c, if !token.is_cancelled() => {
                    warn!("Interrupted, stopping after the current label");
                    token.cancel();
                }
            }
        }

        progress_bar.finish_and_clear();
        set_active_bar(None);

        let summary = handle
            .await
            .map_err(|e| anyhow!("Pipeline task failed: {}", e))??;
        info!("{}: {}", input.display(), summary);
        if let Some(output) = &summary.output {
            info!("Success: {}", output.display());
        }
        Ok(summary)
    }

    /// Translate every drawing of a folder, one after another
    async fn run_folder(
        &self,
        service: &TranslationService,
        store: &JsonDrawingStore,
        input_dir: &Path,
        output_dir: Option<&Path>,
        write_report: bool,
    ) -> Result<Vec<RunSummary>> {
        let drawings = FileManager::find_drawings(input_dir)?;
        if drawings.is_empty() {
            warn!("No drawings found in {:?}", input_dir);
            return Ok(Vec::new());
        }
        info!("Found {} drawing(s) in {:?}", drawings.len(), input_dir);

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(drawings.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summaries = Vec::new();
        for drawing in &drawings {
            let file_name = drawing.file_name().unwrap_or_default().to_string_lossy();
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_file(service, store, drawing, output_dir, write_report, &multi_progress)
                .await
            {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!("{}: {}", drawing.display(), e);
                    if matches!(e.downcast_ref::<PipelineError>(), Some(PipelineError::Cancelled { .. })) {
                        break;
                    }
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        Ok(summaries)
    }

    /// List the labels of a drawing without translating them
    pub fn extract(&self, input: &Path) -> Result<Extraction> {
        let store = self.build_store()?;
        let sanitizer = TranslationService::sanitizer_for(&self.config)?;
        let mut drawing = store.load(input).map_err(PipelineError::DocumentRead)?;
        purge_invalid_text(&mut drawing, &sanitizer);
        Ok(extract_text_items(
            &drawing,
            self.config.pair,
            self.config.document.include_blocks,
            &sanitizer,
        ))
    }

    fn open_cache_repository(&self) -> Result<Repository> {
        let connection = match &self.config.cache.path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        Ok(Repository::new(connection))
    }

    /// Statistics of the persistent cache
    pub async fn cache_stats(&self) -> Result<(PathBuf, CacheStats)> {
        let repository = self.open_cache_repository()?;
        let stats = repository.get_cache_stats().await?;
        Ok((repository.connection().path().to_path_buf(), stats))
    }

    /// Empty the persistent cache, returning the number of removed entries
    pub async fn clear_cache(&self) -> Result<i64> {
        self.open_cache_repository()?.clear_cache().await
    }

    // @returns: Human readable duration
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}
