//! ============================================================================
//! Analysis Service - Style Profile Generation
//! ============================================================================
//! One asynchronous call per analysis run: the session hands over whatever
//! capture handle is active and eventually receives a style profile. Two
//! backends ship with the engine:
//! - SimulatedAnalysis: fixed delay, canned profile (the demo storefront)
//! - RemoteAnalysis: POST to an external style-analysis API
//! Swapping backends never changes the session contract.
//! ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::capture::CaptureHandle;
use crate::types::{Category, Rgb, StyleProfile};

/// Default delay before the simulated backend resolves.
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_secs(2);

/// Error types for analysis backends
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis service unreachable: {0}")]
    Unreachable(String),

    #[error("Analysis service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

/// Produces a style profile from whatever capture handle is active. The
/// session issues exactly one call per analysis run and never retries.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(
        &self,
        capture: Option<CaptureHandle>,
    ) -> Result<StyleProfile, AnalysisError>;
}

/// Stand-in analysis backend. Resolves after a fixed delay with the same
/// profile for every capture.
pub struct SimulatedAnalysis {
    delay: Duration,
}

impl SimulatedAnalysis {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_ANALYSIS_DELAY,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// The canned profile returned by every simulated run.
    pub fn mock_profile() -> StyleProfile {
        StyleProfile {
            skin_tone: "Medium-Warm".to_string(),
            face_shape: "Oval".to_string(),
            body_type: "Hourglass".to_string(),
            color_palette: vec![
                Rgb::new(0xFF6B6B),
                Rgb::new(0x4ECDC4),
                Rgb::new(0x45B7D1),
                Rgb::new(0x96CEB4),
            ],
            recommendations: [
                (
                    Category::Clothing,
                    "V-neck styles complement your face shape".to_string(),
                ),
                (
                    Category::Accessories,
                    "Gold tones match your warm skin undertones".to_string(),
                ),
                (
                    Category::Eyewear,
                    "Round or oval frames suit your face best".to_string(),
                ),
                (
                    Category::Makeup,
                    "Warm coral and peach tones enhance your natural glow".to_string(),
                ),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl Default for SimulatedAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisService for SimulatedAnalysis {
    async fn analyze(
        &self,
        capture: Option<CaptureHandle>,
    ) -> Result<StyleProfile, AnalysisError> {
        debug!(
            "Simulated analysis starting (stream: {:?})",
            capture.map(|c| c.stream_id)
        );
        tokio::time::sleep(self.delay).await;
        Ok(Self::mock_profile())
    }
}

/// Remote analysis backend calling an external style-analysis API.
pub struct RemoteAnalysis {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeRequest {
    capture: Option<CaptureHandle>,
}

impl RemoteAnalysis {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl AnalysisService for RemoteAnalysis {
    async fn analyze(
        &self,
        capture: Option<CaptureHandle>,
    ) -> Result<StyleProfile, AnalysisError> {
        info!("Requesting style analysis from {}", self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { capture });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Service { status, message });
        }

        let profile: StyleProfile = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        profile
            .validate()
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_profile_is_valid() {
        let profile = SimulatedAnalysis::mock_profile();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.color_palette.len(), 4);
        assert_eq!(profile.color_palette[0].packed(), 0xFF6B6B);
        assert_eq!(
            profile.recommendation_for(Category::Eyewear),
            Some("Round or oval frames suit your face best")
        );
    }

    #[test]
    fn test_profile_serializes_with_storefront_field_names() {
        let profile = SimulatedAnalysis::mock_profile();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["skinTone"], "Medium-Warm");
        assert_eq!(json["faceShape"], "Oval");
        assert_eq!(json["colorPalette"][0], "#FF6B6B");
        assert!(json["recommendations"]["makeup"].is_string());
    }

    #[tokio::test]
    async fn test_simulated_analysis_resolves_with_mock_profile() {
        let service = SimulatedAnalysis::with_delay(Duration::from_millis(0));
        let profile = service.analyze(None).await.unwrap();
        assert_eq!(profile, SimulatedAnalysis::mock_profile());
    }
}
