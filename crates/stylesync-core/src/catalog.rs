//! Read-only item catalog, keyed by category. Loaded once and shared by all
//! sessions; never mutated afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::types::{Category, Item, Rgb};

pub struct Catalog {
    items: HashMap<Category, Vec<Item>>,
}

impl Catalog {
    pub fn new(items: HashMap<Category, Vec<Item>>) -> Self {
        Self { items }
    }

    /// Items for a category in catalog order. Unknown slices are empty, not
    /// an error.
    pub fn get(&self, category: Category) -> &[Item] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look an item up by id across every category.
    pub fn find(&self, id: u32) -> Option<&Item> {
        self.items
            .values()
            .flat_map(|items| items.iter())
            .find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The storefront's built-in demo catalog: twelve items across the four
    /// try-on categories.
    pub fn sample() -> Arc<Catalog> {
        Arc::clone(&SAMPLE)
    }
}

static SAMPLE: Lazy<Arc<Catalog>> = Lazy::new(|| {
    let mut items = HashMap::new();
    items.insert(
        Category::Clothing,
        vec![
            sample_item(1, "Summer Dress", 0xFF6B6B, "dress", 89),
            sample_item(2, "Casual Blazer", 0x4ECDC4, "blazer", 129),
            sample_item(3, "Denim Jacket", 0x45B7D1, "jacket", 79),
        ],
    );
    items.insert(
        Category::Accessories,
        vec![
            sample_item(4, "Gold Necklace", 0xFFD93D, "necklace", 199),
            sample_item(5, "Leather Handbag", 0x8B4513, "bag", 249),
            sample_item(6, "Silver Watch", 0xC0C0C0, "watch", 159),
        ],
    );
    items.insert(
        Category::Eyewear,
        vec![
            sample_item(7, "Classic Aviators", 0x000000, "sunglasses", 149),
            sample_item(8, "Round Glasses", 0x8B4513, "prescription", 89),
            sample_item(9, "Cat Eye Frames", 0xFF1493, "fashion", 119),
        ],
    );
    items.insert(
        Category::Makeup,
        vec![
            sample_item(10, "Red Lipstick", 0xDC143C, "lips", 29),
            sample_item(11, "Smokey Eyeshadow", 0x696969, "eyes", 39),
            sample_item(12, "Natural Blush", 0xFFB6C1, "cheeks", 24),
        ],
    );
    Arc::new(Catalog::new(items))
});

fn sample_item(id: u32, name: &str, color: u32, kind: &str, dollars: u32) -> Item {
    Item {
        id,
        name: name.to_string(),
        color: Rgb::new(color),
        kind: kind.to_string(),
        price_cents: dollars * 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_covers_every_category() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.len(), 12);
        for category in Category::ALL {
            assert_eq!(catalog.get(category).len(), 3, "{} slice", category);
        }
    }

    #[test]
    fn test_sample_eyewear_slice_in_catalog_order() {
        let catalog = Catalog::sample();
        let eyewear = catalog.get(Category::Eyewear);
        let ids: Vec<u32> = eyewear.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![7, 8, 9]);
        assert_eq!(eyewear[2].color.packed(), 0xFF1493);
    }

    #[test]
    fn test_find_resolves_ids_across_categories() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.find(5).unwrap().name, "Leather Handbag");
        assert!(catalog.find(999).is_none());
    }
}
