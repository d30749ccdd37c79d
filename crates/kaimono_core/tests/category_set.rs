use kaimono_core::repo::state_repo::CATEGORIES_KEY;
use kaimono_core::{
    Category, CategoryError, ListServiceError, MemoryKvStore, Placement, ShoppingListService,
    StateRepository,
};

fn names(service: &ShoppingListService<&MemoryKvStore>) -> Vec<String> {
    service.categories().iter().map(|c| c.name.clone()).collect()
}

#[test]
fn defaults_are_loaded_when_nothing_is_stored() {
    let kv = MemoryKvStore::new();
    let service = ShoppingListService::load(&kv);
    assert_eq!(names(&service), vec!["食品", "日用品", "飲料", "その他"]);
    assert_eq!(service.category_color("飲料"), "#e8f5e9");
}

#[test]
fn add_category_trims_and_rejects_blank_or_duplicate() {
    let kv = MemoryKvStore::new();
    let mut service = ShoppingListService::load(&kv);

    service.add_category("  冷凍 ", "#B3E5FC").unwrap();
    assert_eq!(names(&service).last().map(String::as_str), Some("冷凍"));

    assert_eq!(
        service.add_category(" ", "#fff").unwrap_err(),
        ListServiceError::Category(CategoryError::EmptyName)
    );
    assert_eq!(
        service.add_category("食品", "#fff").unwrap_err(),
        ListServiceError::Category(CategoryError::DuplicateName("食品".to_string()))
    );
    assert_eq!(service.categories().len(), 5);
    assert!(kv.get_text(CATEGORIES_KEY).unwrap().contains("冷凍"));
}

#[test]
fn last_category_cannot_be_removed() {
    let kv = MemoryKvStore::new();
    StateRepository::new(&kv)
        .save_categories(&[Category::new("食品", "#fce4ec")])
        .unwrap();
    let mut service = ShoppingListService::load(&kv);

    let err = service.remove_category("食品").unwrap_err();
    assert_eq!(
        err,
        ListServiceError::Category(CategoryError::LastCategory("食品".to_string()))
    );
    assert_eq!(service.categories().len(), 1);

    let mut asked = false;
    let result = service.remove_category_confirmed("食品", &mut |_: &str| {
        asked = true;
        true
    });
    assert!(result.is_err());
    assert!(!asked);
    assert_eq!(service.categories().len(), 1);
}

#[test]
fn removing_a_category_leaves_items_dangling() {
    let kv = MemoryKvStore::new();
    let mut service = ShoppingListService::load(&kv);
    let before = service.items().len();

    service.remove_category("日用品").unwrap();
    assert_eq!(service.items().len(), before);
    assert_eq!(service.item("3").unwrap().category, "日用品");
    assert_eq!(service.unreferenced_categories(), vec!["日用品".to_string()]);
    assert_eq!(service.category_color("日用品"), "#fff");

    let visible: usize = service
        .sections(Placement::ToBuy)
        .iter()
        .map(|section| section.items.len())
        .sum();
    assert_eq!(visible, before - 1);

    service.update_item("3", 3, "その他").unwrap();
    assert!(service.unreferenced_categories().is_empty());
}

#[test]
fn selection_is_reset_when_its_category_disappears() {
    let kv = MemoryKvStore::new();
    let mut service = ShoppingListService::load(&kv);
    service.select_category("飲料").unwrap();

    service.add_category("冷凍", "#fff").unwrap();
    assert_eq!(service.selected_category(), "飲料");

    service.move_category(0, 3).unwrap();
    assert_eq!(service.selected_category(), "飲料");

    service.remove_category("飲料").unwrap();
    assert_eq!(service.selected_category(), "日用品");

    assert!(service.select_category("飲料").is_err());
    assert_eq!(service.selected_category(), "日用品");
}

#[test]
fn reorder_requires_the_same_set() {
    let kv = MemoryKvStore::new();
    let mut service = ShoppingListService::load(&kv);

    let mut reversed = service.categories().to_vec();
    reversed.reverse();
    service.reorder_categories(reversed).unwrap();
    assert_eq!(names(&service), vec!["その他", "飲料", "日用品", "食品"]);

    let mut missing = service.categories().to_vec();
    missing.pop();
    assert_eq!(
        service.reorder_categories(missing).unwrap_err(),
        ListServiceError::Category(CategoryError::ReorderMismatch)
    );
    assert_eq!(
        service.reorder_categories(Vec::new()).unwrap_err(),
        ListServiceError::Category(CategoryError::EmptySet)
    );
    assert_eq!(names(&service), vec!["その他", "飲料", "日用品", "食品"]);
}

#[test]
fn reordered_set_is_restored_on_reload() {
    let kv = MemoryKvStore::new();
    let mut service = ShoppingListService::load(&kv);
    service.move_category(3, 0).unwrap();
    drop(service);

    let reloaded = ShoppingListService::load(&kv);
    assert_eq!(names(&reloaded), vec!["その他", "食品", "日用品", "飲料"]);
}

#[test]
fn stored_empty_category_set_falls_back_to_defaults() {
    let kv = MemoryKvStore::new();
    StateRepository::new(&kv).save_categories(&[]).unwrap();

    let mut service = ShoppingListService::load(&kv);
    assert_eq!(service.categories().len(), 4);
    let notices = service.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(service.take_notices().is_empty());
}
