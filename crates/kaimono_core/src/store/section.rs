//! Section projection for the two list views.
//!
//! Pure functions: identical inputs always give identical output.

use crate::model::category::Category;
use crate::model::item::{Item, Placement};
use std::collections::HashSet;

/// One category group within a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: String,
    pub color: String,
    pub items: Vec<Item>,
}

/// Groups items of one placement by category, in category order.
///
/// Sections without items are omitted. Items keep their collection order
/// inside a section. Items whose category is not in `categories` appear in no
/// section.
pub fn group_sections(items: &[Item], categories: &[Category], placement: Placement) -> Vec<Section> {
    categories
        .iter()
        .filter_map(|category| {
            let grouped: Vec<Item> = items
                .iter()
                .filter(|item| item.placement() == placement && item.category == category.name)
                .cloned()
                .collect();
            if grouped.is_empty() {
                None
            } else {
                Some(Section {
                    category: category.name.clone(),
                    color: category.color.clone(),
                    items: grouped,
                })
            }
        })
        .collect()
}

/// Category names referenced by items but missing from `categories`.
///
/// Each name is reported once, in first-seen item order.
pub fn unreferenced_category_names(items: &[Item], categories: &[Category]) -> Vec<String> {
    let known: HashSet<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let mut reported = HashSet::new();
    items
        .iter()
        .map(|item| item.category.as_str())
        .filter(|name| !known.contains(name) && reported.insert(*name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_sections, unreferenced_category_names};
    use crate::model::category::Category;
    use crate::model::item::{Item, Placement};

    fn categories() -> Vec<Category> {
        vec![Category::new("b", "#b"), Category::new("a", "#a")]
    }

    #[test]
    fn sections_follow_category_order_and_skip_empty() {
        let items = vec![
            Item::new("1", "x", "a", 1),
            Item::new("2", "y", "b", 1),
            Item::new("3", "z", "a", 1),
        ];
        let sections = group_sections(&items, &categories(), Placement::ToBuy);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, "b");
        assert_eq!(sections[1].items.len(), 2);
        assert_eq!(sections[1].items[0].key, "1");
        assert!(group_sections(&items, &categories(), Placement::Candidate).is_empty());
    }

    #[test]
    fn projection_is_repeatable() {
        let items = vec![Item::new("1", "x", "a", 1)];
        let first = group_sections(&items, &categories(), Placement::ToBuy);
        let second = group_sections(&items, &categories(), Placement::ToBuy);
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_categories_are_reported_once() {
        let items = vec![
            Item::new("1", "x", "gone", 1),
            Item::new("2", "y", "a", 1),
            Item::new("3", "z", "gone", 1),
            Item::new("4", "w", "lost", 1),
        ];
        assert_eq!(
            unreferenced_category_names(&items, &categories()),
            vec!["gone".to_string(), "lost".to_string()]
        );
        let sections = group_sections(&items, &categories(), Placement::ToBuy);
        let shown: usize = sections.iter().map(|s| s.items.len()).sum();
        assert_eq!(shown, 1);
    }
}
