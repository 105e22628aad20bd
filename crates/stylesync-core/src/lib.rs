//! ============================================================================
//! STYLESYNC-CORE: Virtual Try-On Session Engine
//! ============================================================================
//! Client-side state machine for the Style Sync storefront's try-on feature:
//! - Camera lifecycle as a scoped resource (acquire paired with release)
//! - Asynchronous style analysis with supersede-on-rerun semantics
//! - Palette-based item recommendation over the read-only catalog
//! ============================================================================

pub mod analysis;
pub mod capture;
pub mod catalog;
pub mod recommend;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use analysis::{AnalysisError, AnalysisService, RemoteAnalysis, SimulatedAnalysis};
pub use capture::{
    CaptureConfig, CaptureError, CaptureHandle, CaptureStream, Facing, MediaCapture, TrackHandle,
    VirtualCamera,
};
pub use catalog::Catalog;
pub use session::TryOnSession;
pub use types::{Category, Item, Rgb, SessionSnapshot, StyleProfile, TryOnError};
