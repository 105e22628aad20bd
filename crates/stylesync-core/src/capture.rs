//! ============================================================================
//! Media Capture - Scoped Camera Stream Acquisition
//! ============================================================================
//! The camera is a real device resource: acquisition must be paired with a
//! guaranteed release no matter how the session exits. Streams own their
//! tracks and stop them on release and on drop; stopping is idempotent per
//! track, so double-release is a no-op rather than an error.
//! ============================================================================

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which way the requested camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    User,
    Environment,
}

/// Capture request parameters. The try-on flow always asks for the
/// front-facing camera at 640x480.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            width: 640,
            height: 480,
        }
    }
}

/// Why a capture request failed. Surfaced synchronously to the user; the
/// session never retries on its own.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No capture device found")]
    NoDevice,

    #[error("Capture device busy: {0}")]
    DeviceBusy(String),
}

/// Handle to a single live media track. Stopping is idempotent.
#[derive(Debug, Clone)]
pub struct TrackHandle {
    id: u32,
    live: Arc<AtomicBool>,
}

impl TrackHandle {
    fn new(id: u32) -> Self {
        Self {
            id,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("Track {} stopped", self.id);
        }
    }
}

/// Lightweight descriptor passed to the analysis service. Identifies the
/// active stream without granting access to the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureHandle {
    pub stream_id: Uuid,
    pub width: u32,
    pub height: u32,
}

/// An acquired camera stream. Exclusively owned by one session while active;
/// releasing stops every track, and drop releases whatever is still live so
/// the device cannot leak past teardown.
pub struct CaptureStream {
    id: Uuid,
    config: CaptureConfig,
    tracks: Vec<TrackHandle>,
}

impl CaptureStream {
    pub fn new(config: CaptureConfig, tracks: Vec<TrackHandle>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            tracks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[TrackHandle] {
        &self.tracks
    }

    pub fn live_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    /// Stop every track. Safe to call more than once.
    pub fn release(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    pub fn handle(&self) -> CaptureHandle {
        CaptureHandle {
            stream_id: self.id,
            width: self.config.width,
            height: self.config.height,
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Device camera access producing a live stream, or a synchronous failure
/// (permission denied, no device, device busy).
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn acquire(&self, config: &CaptureConfig) -> Result<CaptureStream, CaptureError>;
}

/// In-process camera backend. Stands in for real device access in demos and
/// tests: hands out streams with a single video track and keeps weak
/// references to every issued track so callers can verify nothing leaks.
pub struct VirtualCamera {
    deny: Option<CaptureError>,
    next_track_id: AtomicU32,
    issued: Mutex<Vec<Weak<AtomicBool>>>,
}

impl VirtualCamera {
    pub fn new() -> Self {
        Self {
            deny: None,
            next_track_id: AtomicU32::new(1),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// A camera that fails every acquisition with the given error.
    pub fn denied(error: CaptureError) -> Self {
        Self {
            deny: Some(error),
            next_track_id: AtomicU32::new(1),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Number of tracks issued by this camera that are still live. Tracks
    /// whose stream has been dropped count as released.
    pub fn live_tracks(&self) -> usize {
        self.issued
            .lock()
            .map(|issued| {
                issued
                    .iter()
                    .filter(|weak| {
                        weak.upgrade()
                            .map(|flag| flag.load(Ordering::SeqCst))
                            .unwrap_or(false)
                    })
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaCapture for VirtualCamera {
    async fn acquire(&self, config: &CaptureConfig) -> Result<CaptureStream, CaptureError> {
        if let Some(err) = &self.deny {
            warn!("Virtual camera denied acquisition: {}", err);
            return Err(err.clone());
        }

        let track = TrackHandle::new(self.next_track_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut issued) = self.issued.lock() {
            issued.push(Arc::downgrade(&track.live));
        }

        info!(
            "Virtual camera acquired {}x{} {:?} stream",
            config.width, config.height, config.facing
        );
        Ok(CaptureStream::new(*config, vec![track]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_yields_live_tracks() {
        let camera = VirtualCamera::new();
        let stream = camera.acquire(&CaptureConfig::default()).await.unwrap();
        assert_eq!(stream.live_tracks(), 1);
        assert_eq!(camera.live_tracks(), 1);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let camera = VirtualCamera::new();
        let stream = camera.acquire(&CaptureConfig::default()).await.unwrap();
        stream.release();
        stream.release();
        assert_eq!(stream.live_tracks(), 0);
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_tracks() {
        let camera = VirtualCamera::new();
        {
            let _stream = camera.acquire(&CaptureConfig::default()).await.unwrap();
            assert_eq!(camera.live_tracks(), 1);
        }
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_denied_camera_fails_acquisition() {
        let camera = VirtualCamera::denied(CaptureError::PermissionDenied);
        let result = camera.acquire(&CaptureConfig::default()).await;
        assert!(result.is_err());
        assert_eq!(camera.live_tracks(), 0);
    }
}
