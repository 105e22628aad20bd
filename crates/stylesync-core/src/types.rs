//! ============================================================================
//! Core Types for the Style Sync Try-On Engine
//! ============================================================================
//! Defines the data model for the virtual try-on flow: categories, catalog
//! items, style profiles, and session errors. These types are serialized to
//! JSON for the presentation layer, so field casing follows the storefront's
//! existing wire format.
//! ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Try-on category tabs. Fixed set, no runtime extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clothing,
    Accessories,
    Eyewear,
    Makeup,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Clothing,
        Category::Accessories,
        Category::Eyewear,
        Category::Makeup,
    ];

    /// Human-readable tab label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Clothing => "Clothing",
            Category::Accessories => "Accessories",
            Category::Eyewear => "Eyewear",
            Category::Makeup => "Makeup",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Clothing => "clothing",
            Category::Accessories => "accessories",
            Category::Eyewear => "eyewear",
            Category::Makeup => "makeup",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = TryOnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clothing" => Ok(Category::Clothing),
            "accessories" => Ok(Category::Accessories),
            "eyewear" => Ok(Category::Eyewear),
            "makeup" => Ok(Category::Makeup),
            _ => Err(TryOnError::UnknownCategory(s.to_string())),
        }
    }
}

/// 24-bit packed RGB color. Serialized as "#RRGGBB" to match the catalog's
/// existing JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(u32);

impl Rgb {
    pub const fn new(packed: u32) -> Self {
        Rgb(packed & 0x00FF_FFFF)
    }

    /// The color as a packed 24-bit integer (0xRRGGBB).
    pub const fn packed(self) -> u32 {
        self.0
    }

    pub fn hex(&self) -> String {
        format!("#{:06X}", self.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = TryOnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(TryOnError::InvalidColor(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb::new)
            .map_err(|_| TryOnError::InvalidColor(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable catalog entry. Owned by the catalog, never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub color: Rgb,
    /// Free-text type label ("dress", "sunglasses", ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub price_cents: u32,
}

impl Item {
    /// Price in the storefront's display form ("$89").
    pub fn price_display(&self) -> String {
        if self.price_cents % 100 == 0 {
            format!("${}", self.price_cents / 100)
        } else {
            format!("${:.2}", f64::from(self.price_cents) / 100.0)
        }
    }
}

/// Result of an analysis pass. Replaced wholesale on re-analysis, never
/// merged into a previous profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    pub skin_tone: String,
    pub face_shape: String,
    pub body_type: String,
    pub color_palette: Vec<Rgb>,
    pub recommendations: HashMap<Category, String>,
}

impl StyleProfile {
    /// A usable profile carries at least one palette color and a
    /// recommendation for every category.
    pub fn validate(&self) -> Result<(), TryOnError> {
        if self.color_palette.is_empty() {
            return Err(TryOnError::InvalidProfile("empty color palette".into()));
        }
        for category in Category::ALL {
            if !self.recommendations.contains_key(&category) {
                return Err(TryOnError::InvalidProfile(format!(
                    "missing recommendation for {}",
                    category
                )));
            }
        }
        Ok(())
    }

    pub fn recommendation_for(&self, category: Category) -> Option<&str> {
        self.recommendations.get(&category).map(String::as_str)
    }
}

/// Read model handed to the presentation layer. A re-render is due whenever
/// any field changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub category: Category,
    pub camera_active: bool,
    pub analyzing: bool,
    pub selected_item: Option<u32>,
    pub profile: Option<StyleProfile>,
    pub last_error: Option<TryOnError>,
}

/// Error types for the try-on session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum TryOnError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    #[error("Invalid style profile: {0}")]
    InvalidProfile(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_round_trip() {
        let color: Rgb = "#FF6B6B".parse().unwrap();
        assert_eq!(color.packed(), 0xFF6B6B);
        assert_eq!(color.hex(), "#FF6B6B");

        let bare: Rgb = "4ecdc4".parse().unwrap();
        assert_eq!(bare.packed(), 0x4ECDC4);
    }

    #[test]
    fn test_rgb_rejects_malformed_input() {
        assert!("#FFF".parse::<Rgb>().is_err());
        assert!("#GGGGGG".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("eyewear".parse::<Category>().unwrap(), Category::Eyewear);
        assert_eq!("Makeup".parse::<Category>().unwrap(), Category::Makeup);
        assert!("sneakers".parse::<Category>().is_err());
        assert_eq!(Category::Accessories.to_string(), "accessories");
    }

    #[test]
    fn test_price_display() {
        let mut item = Item {
            id: 1,
            name: "Summer Dress".into(),
            color: Rgb::new(0xFF6B6B),
            kind: "dress".into(),
            price_cents: 8900,
        };
        assert_eq!(item.price_display(), "$89");

        item.price_cents = 2450;
        assert_eq!(item.price_display(), "$24.50");
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = StyleProfile {
            skin_tone: "Medium-Warm".into(),
            face_shape: "Oval".into(),
            body_type: "Hourglass".into(),
            color_palette: vec![Rgb::new(0xFF6B6B)],
            recommendations: Category::ALL
                .iter()
                .map(|c| (*c, "ok".to_string()))
                .collect(),
        };
        assert!(profile.validate().is_ok());

        profile.recommendations.remove(&Category::Makeup);
        assert!(profile.validate().is_err());

        profile.recommendations.insert(Category::Makeup, "ok".into());
        profile.color_palette.clear();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_item_serializes_with_storefront_field_names() {
        let item = Item {
            id: 7,
            name: "Classic Aviators".into(),
            color: Rgb::new(0x000000),
            kind: "sunglasses".into(),
            price_cents: 14900,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "sunglasses");
        assert_eq!(json["color"], "#000000");
        assert_eq!(json["priceCents"], 14900);
    }
}
