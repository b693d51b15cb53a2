/*!
 * Pipeline orchestrator for one drawing.
 *
 * A run moves through `Idle → Reading → Extracting → Translating → Writing
 * → Reporting → Done`. Reading and saving failures end the run in `Failed`;
 * a cancellation checked between items ends it in `Cancelled`. Items are
 * translated strictly one after another so every lookup sees the results
 * cached before it.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use super::report::write_report;
use super::walker::extract_text_items;
use super::writer::{purge_invalid_text, write_back};
use super::TextItem;
use crate::app_config::Config;
use crate::document::DocumentStore;
use crate::errors::PipelineError;
use crate::translation::{PairKey, TranslationOutcome, TranslationService};

/// Phases of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Reading,
    Extracting,
    Translating,
    Writing,
    Reporting,
    Done,
    Failed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Extracting => "extracting",
            Self::Translating => "translating",
            Self::Writing => "writing",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Cooperative cancellation flag shared with the foreground
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Message sent to the foreground while a run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    StateChanged {
        run_id: Uuid,
        state: RunState,
    },
    ItemsFound {
        run_id: Uuid,
        total: usize,
    },
    ItemDone {
        run_id: Uuid,
        index: usize,
        total: usize,
        original: String,
        translated: String,
        outcome: TranslationOutcome,
    },
    Finished(RunSummary),
}

/// Per-run settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pair: PairKey,
    /// Walk non-system blocks too
    pub include_groups: bool,
    /// Font wrapped around translated MTEXT
    pub mtext_font: Option<String>,
}

impl RunOptions {
    pub fn new(pair: PairKey) -> Self {
        Self {
            pair,
            include_groups: false,
            mtext_font: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            pair: config.pair,
            include_groups: config.document.include_blocks,
            mtext_font: config.document.mtext_font.clone(),
        }
    }
}

/// Counts and paths of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub state: RunState,
    /// Items extracted for translation
    pub found: usize,
    /// Items whose translation differs from the original
    pub translated: usize,
    /// Labels left out as invalid, codes or off-script
    pub skipped: usize,
    pub failed: usize,
    pub cache_hits: usize,
    /// Elements actually updated in the drawing
    pub written: usize,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: RunState::Idle,
            found: 0,
            translated: 0,
            skipped: 0,
            failed: 0,
            cache_hits: 0,
            written: 0,
            output: None,
            report: None,
            elapsed: Duration::ZERO,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} item(s) found, {} translated, {} skipped, {} failed, {} cache hit(s)",
            self.found, self.translated, self.skipped, self.failed, self.cache_hits
        )
    }
}

/// One pipeline run over a single drawing
pub struct PipelineRun<S: DocumentStore> {
    store: S,
    service: TranslationService,
    options: RunOptions,
    progress: Option<UnboundedSender<ProgressEvent>>,
    cancel: CancellationToken,
    summary: RunSummary,
    items: Vec<TextItem>,
}

impl<S: DocumentStore> PipelineRun<S> {
    pub fn new(store: S, service: TranslationService, options: RunOptions) -> Self {
        Self {
            store,
            service,
            options,
            progress: None,
            cancel: CancellationToken::new(),
            summary: RunSummary::new(Uuid::new_v4()),
            items: Vec::new(),
        }
    }

    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.summary.run_id
    }

    pub fn state(&self) -> RunState {
        self.summary.state
    }

    /// Items of the last run with their translations
    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    fn tag(&self) -> String {
        self.summary.run_id.to_string()[..8].to_string()
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            // A closed receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }

    fn set_state(&mut self, state: RunState) {
        debug!("[{}] {} -> {}", self.tag(), self.summary.state, state);
        self.summary.state = state;
        self.emit(ProgressEvent::StateChanged {
            run_id: self.summary.run_id,
            state,
        });
    }

    fn finish(&mut self, state: RunState, started: Instant) -> RunSummary {
        self.set_state(state);
        self.summary.elapsed = started.elapsed();
        let summary = self.summary.clone();
        self.emit(ProgressEvent::Finished(summary.clone()));
        summary
    }

    fn write_partial_report(&self, report: Option<&Path>) -> Option<PathBuf> {
        let path = report?;
        match write_report(path, &self.items) {
            Ok(_) => Some(path.to_path_buf()),
            Err(e) => {
                error!("[{}] {}", self.tag(), e);
                None
            }
        }
    }

    /// Translate `input` into `output`, writing the audit report to `report`
    pub async fn run(
        &mut self,
        input: &Path,
        output: &Path,
        report: Option<&Path>,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let sanitizer = self.service.sanitizer().clone();
        let pair = self.options.pair;
        info!(
            "[{}] Translating {} ({})",
            self.tag(),
            input.display(),
            pair.config().display_name
        );

        self.set_state(RunState::Reading);
        let mut document = match self.store.load(input) {
            Ok(document) => document,
            Err(e) => {
                error!("[{}] {}", self.tag(), e);
                self.finish(RunState::Failed, started);
                return Err(PipelineError::DocumentRead(e));
            }
        };
        purge_invalid_text(&mut document, &sanitizer);

        self.set_state(RunState::Extracting);
        let extraction =
            extract_text_items(&document, pair, self.options.include_groups, &sanitizer);
        self.items = extraction.items;
        self.summary.found = self.items.len();
        self.summary.skipped = extraction.skipped;
        self.emit(ProgressEvent::ItemsFound {
            run_id: self.summary.run_id,
            total: self.items.len(),
        });

        self.set_state(RunState::Translating);
        let total = self.items.len();
        for index in 0..total {
            if self.cancel.is_cancelled() {
                warn!("[{}] Cancelled after {} of {} item(s)", self.tag(), index, total);
                self.summary.report = self.write_partial_report(report);
                self.finish(RunState::Cancelled, started);
                return Err(PipelineError::Cancelled {
                    processed: index,
                    total,
                });
            }

            let original = self.items[index].original_text.clone();
            let translation = self.service.translate_with_outcome(&original, Some(pair)).await;
            match &translation.outcome {
                TranslationOutcome::CacheHit => self.summary.cache_hits += 1,
                TranslationOutcome::Failed(_) => self.summary.failed += 1,
                outcome if outcome.is_skip() => self.summary.skipped += 1,
                _ => {}
            }

            let item = &mut self.items[index];
            item.translated_text = Some(translation.text.clone());
            item.outcome = Some(translation.outcome.clone());
            if item.is_changed() {
                self.summary.translated += 1;
            }
            self.emit(ProgressEvent::ItemDone {
                run_id: self.summary.run_id,
                index,
                total,
                original,
                translated: translation.text,
                outcome: translation.outcome,
            });
        }

        self.set_state(RunState::Writing);
        let font = self.options.mtext_font.as_deref();
        for item in self.items.iter().filter(|item| item.is_changed()) {
            if let Some(translated) = &item.translated_text {
                if write_back(&mut document, item, translated, &sanitizer, font) {
                    self.summary.written += 1;
                }
            }
        }
        purge_invalid_text(&mut document, &sanitizer);

        if let Err(e) = self.store.save(&document, output) {
            error!("[{}] {}", self.tag(), e);
            self.set_state(RunState::Reporting);
            let written_report = self.write_partial_report(report);
            self.summary.report = written_report.clone();
            self.finish(RunState::Failed, started);
            return Err(PipelineError::DocumentWrite {
                source: e,
                report: written_report,
            });
        }
        self.summary.output = Some(output.to_path_buf());

        self.set_state(RunState::Reporting);
        if let Some(path) = report {
            if let Err(e) = write_report(path, &self.items) {
                self.finish(RunState::Failed, started);
                return Err(e);
            }
            self.summary.report = Some(path.to_path_buf());
        }

        let summary = self.finish(RunState::Done, started);
        info!("[{}] {} ({} written)", self.tag(), summary, summary.written);
        Ok(summary)
    }
}
