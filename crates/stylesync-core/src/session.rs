//! ============================================================================
//! TryOnSession - Camera, Analysis, and Recommendation State Machine
//! ============================================================================
//! Owns the client-side try-on flow: camera lifecycle, the asynchronous
//! style-analysis call, item selection, and recommendation filtering.
//!
//! Every mutation goes through the session under one lock, so observers
//! never see a partially applied change. The analysis call is the single
//! suspension point: it runs in a spawned task (clone Arc -> tokio::spawn)
//! and the session stays responsive while it is outstanding. Each run gets a
//! generation number; a completion whose generation is no longer current is
//! discarded wholesale, so overlapping runs cannot fight over the profile.
//! ============================================================================

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisService;
use crate::capture::{CaptureConfig, CaptureStream, MediaCapture};
use crate::catalog::Catalog;
use crate::recommend::filter_by_palette;
use crate::types::{Category, Item, SessionSnapshot, StyleProfile, TryOnError};

struct SessionState {
    category: Category,
    stream: Option<CaptureStream>,
    selected_item: Option<u32>,
    profile: Option<StyleProfile>,
    analyzing: bool,
    last_error: Option<TryOnError>,
    analysis_generation: u64,
    analysis_task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            category: self.category,
            camera_active: self.stream.is_some(),
            analyzing: self.analyzing,
            selected_item: self.selected_item,
            profile: self.profile.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// A user's virtual try-on session. Created with the camera off, no profile,
/// and the clothing tab active; torn down with `close` (or drop, which also
/// releases the camera through the stream's own drop guard).
pub struct TryOnSession {
    catalog: Arc<Catalog>,
    capture: Arc<dyn MediaCapture>,
    analysis: Arc<dyn AnalysisService>,
    capture_config: CaptureConfig,
    state: Arc<RwLock<SessionState>>,
    changed: watch::Sender<SessionSnapshot>,
}

impl TryOnSession {
    pub fn new(
        catalog: Arc<Catalog>,
        capture: Arc<dyn MediaCapture>,
        analysis: Arc<dyn AnalysisService>,
    ) -> Self {
        let state = SessionState {
            category: Category::Clothing,
            stream: None,
            selected_item: None,
            profile: None,
            analyzing: false,
            last_error: None,
            analysis_generation: 0,
            analysis_task: None,
        };
        let (changed, _) = watch::channel(state.snapshot());
        Self {
            catalog,
            capture,
            analysis,
            capture_config: CaptureConfig::default(),
            state: Arc::new(RwLock::new(state)),
            changed,
        }
    }

    /// Override the capture request (front-facing 640x480 by default).
    pub fn with_capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture_config = config;
        self
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Switch the active category tab. Leaves the selection and profile
    /// alone.
    pub async fn set_category(&self, category: Category) {
        let snapshot = {
            let mut state = self.state.write().await;
            state.category = category;
            state.snapshot()
        };
        debug!("Category set to {}", category);
        let _ = self.changed.send(snapshot);
    }

    /// Highlight an item. The id is not checked against the catalog here;
    /// resolution happens at query time and a dangling id means no
    /// highlight.
    pub async fn select_item(&self, item_id: u32) {
        let snapshot = {
            let mut state = self.state.write().await;
            state.selected_item = Some(item_id);
            state.snapshot()
        };
        debug!("Item {} selected", item_id);
        let _ = self.changed.send(snapshot);
    }

    /// Drop the current highlight.
    pub async fn clear_selection(&self) {
        let snapshot = {
            let mut state = self.state.write().await;
            state.selected_item = None;
            state.snapshot()
        };
        let _ = self.changed.send(snapshot);
    }

    /// Request the camera and bind the stream. On failure the camera stays
    /// off, the error is recorded for the presentation layer, and the caller
    /// gets it back synchronously; nothing retries.
    pub async fn start_capture(&self) -> Result<(), TryOnError> {
        match self.capture.acquire(&self.capture_config).await {
            Ok(stream) => {
                info!("Camera stream {} acquired", stream.id());
                let snapshot = {
                    let mut state = self.state.write().await;
                    // Replacing an already-bound stream releases the old one
                    // through its drop guard; the device never double-books.
                    state.stream = Some(stream);
                    state.last_error = None;
                    state.snapshot()
                };
                let _ = self.changed.send(snapshot);
                Ok(())
            }
            Err(err) => {
                warn!("Camera acquisition failed: {}", err);
                let error = TryOnError::CameraUnavailable(err.to_string());
                let snapshot = {
                    let mut state = self.state.write().await;
                    state.last_error = Some(error.clone());
                    state.snapshot()
                };
                let _ = self.changed.send(snapshot);
                Err(error)
            }
        }
    }

    /// Release every track and turn the camera off. Calling with no active
    /// stream is a no-op, not an error.
    pub async fn stop_capture(&self) {
        let mut state = self.state.write().await;
        if let Some(stream) = state.stream.take() {
            stream.release();
            info!("Camera stream {} released", stream.id());
            let snapshot = state.snapshot();
            drop(state);
            let _ = self.changed.send(snapshot);
        }
    }

    /// Kick off a style analysis. `analyzing` is observable before this
    /// returns; the service call itself runs in a spawned task so category
    /// switching and selection stay usable while it is outstanding. Starting
    /// a new run supersedes any in-flight one: the older completion is
    /// discarded whether it would have succeeded or failed, and the previous
    /// profile stays visible until the current run resolves.
    pub async fn run_analysis(&self) {
        let (generation, capture_handle, snapshot) = {
            let mut state = self.state.write().await;
            state.analyzing = true;
            state.analysis_generation += 1;
            if let Some(task) = state.analysis_task.take() {
                task.abort();
            }
            (
                state.analysis_generation,
                state.stream.as_ref().map(CaptureStream::handle),
                state.snapshot(),
            )
        };
        let _ = self.changed.send(snapshot);
        info!("Analysis {} started", generation);

        let service = Arc::clone(&self.analysis);
        let shared = Arc::clone(&self.state);
        let changed = self.changed.clone();
        let task = tokio::spawn(async move {
            let result = service.analyze(capture_handle).await;

            let mut state = shared.write().await;
            if state.analysis_generation != generation {
                debug!("Analysis {} superseded, discarding result", generation);
                return;
            }
            state.analyzing = false;
            match result {
                Ok(profile) => {
                    info!("Analysis {} complete", generation);
                    state.profile = Some(profile);
                    state.last_error = None;
                }
                Err(err) => {
                    warn!("Analysis {} failed: {}", generation, err);
                    state.last_error = Some(TryOnError::AnalysisFailed(err.to_string()));
                }
            }
            let snapshot = state.snapshot();
            drop(state);
            let _ = changed.send(snapshot);
        });

        let mut state = self.state.write().await;
        if state.analysis_generation == generation {
            state.analysis_task = Some(task);
        }
    }

    /// Tear the session down: discard any in-flight analysis and release the
    /// camera. Safe to call more than once.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.analysis_generation += 1;
        if let Some(task) = state.analysis_task.take() {
            task.abort();
        }
        state.analyzing = false;
        if let Some(stream) = state.stream.take() {
            stream.release();
            info!("Camera stream {} released at teardown", stream.id());
        }
        let snapshot = state.snapshot();
        drop(state);
        let _ = self.changed.send(snapshot);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current read model for the presentation layer.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Change feed for the presentation layer; yields whenever a rendered
    /// field changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changed.subscribe()
    }

    pub async fn camera_active(&self) -> bool {
        self.state.read().await.stream.is_some()
    }

    /// Latest style profile, if any analysis has completed.
    pub async fn profile(&self) -> Option<StyleProfile> {
        self.state.read().await.profile.clone()
    }

    /// Resolve the highlighted item against the catalog. A dangling id (or
    /// no selection at all) resolves to no highlight.
    pub async fn selected_item(&self) -> Option<Item> {
        let state = self.state.read().await;
        state
            .selected_item
            .and_then(|id| self.catalog.find(id).cloned())
    }

    /// Items to show for the active category: the full catalog slice until a
    /// profile exists, then only palette matches. An empty filtered result
    /// stays empty.
    pub async fn recommended_items(&self) -> Vec<Item> {
        let state = self.state.read().await;
        let items = self.catalog.get(state.category);
        match &state.profile {
            Some(profile) => filter_by_palette(items, &profile.color_palette),
            None => items.to_vec(),
        }
    }
}
