//! Palette-based recommendation filter over catalog slices.

use crate::types::{Item, Rgb};

/// Packed-RGB distance below which a palette color counts as a match.
///
/// The difference is taken over the packed 24-bit value, not per channel, so
/// a change in the red byte outweighs any change in blue. Shipped
/// recommendations depend on this exact metric; do not swap in a perceptual
/// distance without re-baselining the catalog.
pub const COLOR_MATCH_THRESHOLD: i64 = 1_000_000;

/// Absolute difference between two colors as packed 24-bit integers.
pub fn color_distance(a: Rgb, b: Rgb) -> i64 {
    (i64::from(a.packed()) - i64::from(b.packed())).abs()
}

/// Whether any palette color sits within the match threshold of `color`.
pub fn palette_matches(palette: &[Rgb], color: Rgb) -> bool {
    palette
        .iter()
        .any(|p| color_distance(*p, color) < COLOR_MATCH_THRESHOLD)
}

/// Items whose color matches the palette, preserving catalog order. An empty
/// result is returned as-is; there is no fallback to the unfiltered list.
pub fn filter_by_palette(items: &[Item], palette: &[Rgb]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| palette_matches(palette, item.color))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::Category;

    #[test]
    fn test_color_distance_is_packed_integer_difference() {
        let coral = Rgb::new(0xFF6B6B);
        let pink = Rgb::new(0xFF1493);
        assert_eq!(color_distance(coral, pink), 22_232);
        assert_eq!(color_distance(coral, Rgb::new(0x000000)), 16_739_179);
    }

    #[test]
    fn test_eyewear_filter_keeps_only_cat_eye_frames() {
        let catalog = Catalog::sample();
        let palette = vec![Rgb::new(0xFF6B6B)];

        let matched = filter_by_palette(catalog.get(Category::Eyewear), &palette);

        // 0xFF1493 is 22,232 away; 0x000000 and 0x8B4513 both exceed the
        // threshold (16,739,179 and 7,611,992).
        let ids: Vec<u32> = matched.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[test]
    fn test_no_match_yields_empty_result() {
        let catalog = Catalog::sample();
        let palette = vec![Rgb::new(0x7FFFFF)];

        let matched = filter_by_palette(catalog.get(Category::Makeup), &palette);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_filter_preserves_catalog_order() {
        let catalog = Catalog::sample();
        // Wide-open palette: one color close to each clothing item.
        let palette = vec![
            Rgb::new(0xFF6B6B),
            Rgb::new(0x4ECDC4),
            Rgb::new(0x45B7D1),
        ];

        let matched = filter_by_palette(catalog.get(Category::Clothing), &palette);
        let ids: Vec<u32> = matched.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
