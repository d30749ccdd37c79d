//! Shopping-list use-case service (reconciliation layer).
//!
//! # Responsibility
//! - Own the category, item and template stores for one session.
//! - Apply UI events as single atomic steps and flush the touched record.
//! - Expand templates with merge-or-create semantics.
//!
//! # Invariants
//! - The selected category always names an existing category.
//! - The category set is never empty.
//! - A failed write never rolls back the in-memory change.
//! - Templates are read from storage on first use only.

use crate::model::category::Category;
use crate::model::item::{demo_items, Item, ItemKey, ItemKeyGenerator, Placement};
use crate::model::template::{TemplateId, TemplateItem};
use crate::repo::kv_store::KvStore;
use crate::repo::state_repo::{
    RepoResult, StateRepository, StorageStatus, StoredList, CATEGORIES_KEY, ITEMS_KEY,
    TEMPLATES_KEY,
};
use crate::service::confirm::Confirm;
use crate::service::notice::ServiceNotice;
use crate::store::category_store::{CategoryError, CategoryStore};
use crate::store::item_store::{ItemError, ItemStore};
use crate::store::section::{group_sections, unreferenced_category_names, Section};
use crate::store::template_store::{TemplateError, TemplateStore};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How an item record that was written empty is treated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Seed demo items only when the record was never written.
    #[default]
    FirstRunOnly,
    /// Seed demo items whenever the stored list is empty, including after a
    /// bulk clear. Matches the legacy app.
    ReseedWhenEmpty,
}

/// Tunables for `ShoppingListService`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub seed_policy: SeedPolicy,
}

/// Rejected list operations. State is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListServiceError {
    Item(ItemError),
    Category(CategoryError),
    Template(TemplateError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(err) => write!(f, "{err}"),
            Self::Category(err) => write!(f, "{err}"),
            Self::Template(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Item(err) => Some(err),
            Self::Category(err) => Some(err),
            Self::Template(err) => Some(err),
        }
    }
}

impl From<ItemError> for ListServiceError {
    fn from(value: ItemError) -> Self {
        Self::Item(value)
    }
}

impl From<CategoryError> for ListServiceError {
    fn from(value: CategoryError) -> Self {
        Self::Category(value)
    }
}

impl From<TemplateError> for ListServiceError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

pub type ListResult<T> = Result<T, ListServiceError>;

/// Result of applying a template to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateApplication {
    /// An existing to-buy item with the same label and category was bumped.
    Merged { key: ItemKey, quantity: u32 },
    /// A new to-buy item was prepended.
    Created { key: ItemKey },
}

impl TemplateApplication {
    pub fn key(&self) -> &str {
        match self {
            Self::Merged { key, .. } | Self::Created { key } => key,
        }
    }
}

/// Session state for the shopping list, backed by a key-value store.
pub struct ShoppingListService<K: KvStore> {
    repo: StateRepository<K>,
    categories: CategoryStore,
    items: ItemStore,
    templates: Option<TemplateStore>,
    selected_category: String,
    keys: ItemKeyGenerator,
    notices: Vec<ServiceNotice>,
}

impl<K: KvStore> ShoppingListService<K> {
    /// Loads categories and items (seeding when needed) with default config.
    pub fn load(kv: K) -> Self {
        Self::load_with_config(kv, ServiceConfig::default())
    }

    /// Loads categories and items from `kv`.
    ///
    /// Never fails: unreadable records fall back to defaults and queue a
    /// `LoadFailed` notice.
    pub fn load_with_config(kv: K, config: ServiceConfig) -> Self {
        let repo = StateRepository::new(kv);
        let mut notices = Vec::new();

        let categories = load_categories(&repo, &mut notices);
        let (items, seeded) = load_items(&repo, config.seed_policy, &mut notices);
        let selected_category = categories.first().name.clone();

        let mut service = Self {
            repo,
            categories,
            items,
            templates: None,
            selected_category,
            keys: ItemKeyGenerator::new(),
            notices,
        };
        if seeded {
            service.persist_items();
        }
        info!(
            "event=list_load module=list status=ok items={} categories={} seeded={} seed_policy={:?}",
            service.items.len(),
            service.categories.len(),
            seeded,
            config.seed_policy
        );
        service
    }

    pub fn repository(&self) -> &StateRepository<K> {
        &self.repo
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.as_slice()
    }

    pub fn items(&self) -> &[Item] {
        self.items.as_slice()
    }

    pub fn item(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    /// Display color of a category, or the fallback for dangling names.
    pub fn category_color(&self, name: &str) -> &str {
        self.categories.color_of(name)
    }

    /// Drains notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<ServiceNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Section projection for one list view.
    pub fn sections(&self, placement: Placement) -> Vec<Section> {
        group_sections(self.items.as_slice(), self.categories.as_slice(), placement)
    }

    /// Category names referenced by items but no longer defined.
    pub fn unreferenced_categories(&self) -> Vec<String> {
        unreferenced_category_names(self.items.as_slice(), self.categories.as_slice())
    }

    // ----- items -----

    /// Adds a to-buy item at the top of the list and resets the add-form
    /// selection to the first category.
    ///
    /// # Errors
    /// - `ItemError::EmptyLabel` when the label is blank; nothing changes.
    pub fn add_item(&mut self, label: &str, category: &str, quantity: u32) -> ListResult<ItemKey> {
        let key = self.fresh_key();
        let key = match self.items.add_item(key, label, category, quantity) {
            Ok(item) => item.key.clone(),
            Err(err) => {
                debug!("event=item_add module=list status=rejected reason={err}");
                return Err(err.into());
            }
        };
        info!("event=item_add module=list status=ok key={key} category={category}");
        self.persist_items();
        self.selected_category = self.categories.first().name.clone();
        Ok(key)
    }

    /// Adds an item under the currently selected category.
    ///
    /// Like every successful add, resets the selection to the first category.
    pub fn add_item_to_selected(&mut self, label: &str, quantity: u32) -> ListResult<ItemKey> {
        let category = self.selected_category.clone();
        self.add_item(label, &category, quantity)
    }

    /// Flips candidate/to-buy placement. Unknown keys are a no-op.
    pub fn toggle_added(&mut self, key: &str) -> Option<Placement> {
        let placement = self.items.toggle_added(key)?;
        info!("event=item_toggle module=list status=ok key={key} placement={placement:?}");
        self.persist_items();
        Some(placement)
    }

    /// Overwrites quantity (clamped to >= 1) and category.
    ///
    /// The category is not checked against the category set.
    pub fn update_item(&mut self, key: &str, quantity: u32, category: &str) -> ListResult<()> {
        self.items.update_item(key, quantity, category)?;
        info!("event=item_update module=list status=ok key={key} category={category}");
        self.persist_items();
        Ok(())
    }

    pub fn increment_quantity(&mut self, key: &str) -> ListResult<u32> {
        let quantity = self.items.increment_quantity(key)?;
        self.persist_items();
        Ok(quantity)
    }

    /// Decrements quantity, stopping at 1.
    pub fn decrement_quantity(&mut self, key: &str) -> ListResult<u32> {
        let quantity = self.items.decrement_quantity(key)?;
        self.persist_items();
        Ok(quantity)
    }

    /// Removes one item unconditionally.
    pub fn delete_item(&mut self, key: &str) -> Option<Item> {
        let removed = self.items.delete_item(key)?;
        info!("event=item_delete module=list status=ok key={key}");
        self.persist_items();
        Some(removed)
    }

    /// Asks `confirm` before removing one item.
    pub fn delete_item_confirmed(&mut self, key: &str, confirm: &mut impl Confirm) -> Option<Item> {
        let label = self.items.get(key)?.label.clone();
        if !confirm.confirm(&format!("\"{label}\" を削除しますか？")) {
            return None;
        }
        self.delete_item(key)
    }

    /// Empties the item list and writes an empty record.
    pub fn clear_all(&mut self) {
        let removed = self.items.len();
        self.items.clear_all();
        info!("event=item_clear module=list status=ok removed={removed}");
        self.persist_items();
    }

    /// Asks `confirm` before emptying the list. Returns whether it ran.
    pub fn clear_all_confirmed(&mut self, confirm: &mut impl Confirm) -> bool {
        if !confirm.confirm("すべてのデータを削除しますか？") {
            return false;
        }
        self.clear_all();
        true
    }

    // ----- categories -----

    /// Selects the category used by the add-item form.
    pub fn select_category(&mut self, name: &str) -> ListResult<()> {
        if !self.categories.contains(name) {
            return Err(CategoryError::NotFound(name.to_string()).into());
        }
        self.selected_category = name.to_string();
        Ok(())
    }

    /// Appends a category.
    ///
    /// # Errors
    /// - `EmptyName` / `DuplicateName`; nothing changes.
    pub fn add_category(&mut self, name: &str, color: &str) -> ListResult<()> {
        let added = self.categories.add(name, color)?.name.clone();
        info!("event=category_add module=list status=ok category={added}");
        self.after_category_change();
        Ok(())
    }

    /// Removes a category. Items keep the stale name.
    ///
    /// # Errors
    /// - `LastCategory` when only one category remains; `NotFound`.
    pub fn remove_category(&mut self, name: &str) -> ListResult<()> {
        self.categories.remove(name)?;
        let orphaned = self
            .items
            .as_slice()
            .iter()
            .filter(|item| item.category == name)
            .count();
        info!("event=category_remove module=list status=ok category={name} orphaned_items={orphaned}");
        self.after_category_change();
        Ok(())
    }

    /// Asks `confirm` before removing a category. Returns whether it ran.
    pub fn remove_category_confirmed(
        &mut self,
        name: &str,
        confirm: &mut impl Confirm,
    ) -> ListResult<bool> {
        if !self.categories.contains(name) {
            return Err(CategoryError::NotFound(name.to_string()).into());
        }
        if self.categories.len() <= 1 {
            return Err(CategoryError::LastCategory(name.to_string()).into());
        }
        if !confirm.confirm(&format!("カテゴリ「{name}」を削除しますか？")) {
            return Ok(false);
        }
        self.remove_category(name)?;
        Ok(true)
    }

    /// Replaces the category order wholesale.
    pub fn reorder_categories(&mut self, reordered: Vec<Category>) -> ListResult<()> {
        self.categories.reorder(reordered)?;
        info!("event=category_reorder module=list status=ok");
        self.after_category_change();
        Ok(())
    }

    /// Moves one category between positions.
    pub fn move_category(&mut self, from: usize, to: usize) -> ListResult<()> {
        self.categories.move_category(from, to)?;
        info!("event=category_reorder module=list status=ok from={from} to={to}");
        self.after_category_change();
        Ok(())
    }

    // ----- templates -----

    /// Returns templates, reading them from storage on first call.
    pub fn templates(&mut self) -> &[TemplateItem] {
        self.template_store().as_slice()
    }

    /// Saves a new template at the top of the template list.
    pub fn add_template(
        &mut self,
        label: &str,
        category: &str,
        default_quantity: u32,
    ) -> ListResult<TemplateId> {
        let id = self
            .template_store()
            .add_template(label, category, default_quantity)?
            .id
            .clone();
        info!("event=template_add module=list status=ok id={id} category={category}");
        self.persist_templates();
        Ok(id)
    }

    /// Deletes a template. Items created from it are untouched.
    pub fn delete_template(&mut self, id: &str) -> ListResult<TemplateItem> {
        let removed = self.template_store().delete_template(id)?;
        info!("event=template_delete module=list status=ok id={id}");
        self.persist_templates();
        Ok(removed)
    }

    /// Asks `confirm` before deleting a template. Returns whether it ran.
    pub fn delete_template_confirmed(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> ListResult<bool> {
        if self.template_store().get(id).is_none() {
            return Err(TemplateError::NotFound(id.to_string()).into());
        }
        if !confirm.confirm("このテンプレートを削除しますか？") {
            return Ok(false);
        }
        self.delete_template(id)?;
        Ok(true)
    }

    /// Applies a stored template by id.
    pub fn apply_template(&mut self, id: &str) -> ListResult<TemplateApplication> {
        let template = self
            .template_store()
            .get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        self.apply_template_item(&template)
    }

    /// Merges into an exact label+category to-buy match, or creates a new item.
    ///
    /// Matching is exact and case-sensitive on the trimmed label, the same
    /// form a created item is stored in. Candidate items never match.
    ///
    /// # Errors
    /// - `ItemError::EmptyLabel` when a caller-built template has a blank label.
    pub fn apply_template_item(&mut self, template: &TemplateItem) -> ListResult<TemplateApplication> {
        let existing = self
            .items
            .find_to_buy(template.label.trim(), &template.category)
            .map(|item| item.key.clone());

        let application = match existing {
            Some(key) => {
                let quantity = self.items.add_quantity(&key, template.default_quantity)?;
                TemplateApplication::Merged { key, quantity }
            }
            None => {
                let key = self.fresh_key();
                let created = self.items.add_item(
                    key,
                    &template.label,
                    &template.category,
                    template.default_quantity,
                )?;
                TemplateApplication::Created {
                    key: created.key.clone(),
                }
            }
        };
        let outcome = match &application {
            TemplateApplication::Merged { .. } => "merged",
            TemplateApplication::Created { .. } => "created",
        };
        info!(
            "event=template_apply module=list status=ok template_id={} outcome={outcome}",
            template.id
        );
        self.persist_items();
        Ok(application)
    }

    // ----- internals -----

    fn fresh_key(&mut self) -> ItemKey {
        loop {
            let key = self.keys.next_key();
            if !self.items.contains_key(&key) {
                return key;
            }
        }
    }

    fn template_store(&mut self) -> &mut TemplateStore {
        if self.templates.is_none() {
            let store = match self.repo.load_templates() {
                Ok(stored) => {
                    push_dropped_rows(&mut self.notices, TEMPLATES_KEY, stored.skipped);
                    TemplateStore::from_templates(stored.records)
                }
                Err(err) => {
                    self.record_load_failure(TEMPLATES_KEY, &err);
                    TemplateStore::new()
                }
            };
            debug!(
                "event=template_load module=list status=ok templates={}",
                store.len()
            );
            self.templates = Some(store);
        }
        self.templates.get_or_insert_with(TemplateStore::new)
    }

    fn after_category_change(&mut self) {
        let resolved = self.categories.resolve_selection(&self.selected_category);
        if resolved != self.selected_category {
            debug!(
                "event=category_select module=list status=ok reason=revalidated selected={resolved}"
            );
            self.selected_category = resolved;
        }
        let result = self.repo.save_categories(self.categories.as_slice());
        self.record_save_result(CATEGORIES_KEY, result);
    }

    fn persist_items(&mut self) {
        let result = self.repo.save_items(self.items.as_slice());
        self.record_save_result(ITEMS_KEY, result);
    }

    fn persist_templates(&mut self) {
        let Some(store) = self.templates.as_ref() else {
            return;
        };
        let result = self.repo.save_templates(store.as_slice());
        self.record_save_result(TEMPLATES_KEY, result);
    }

    fn record_save_result(&mut self, record: &'static str, result: RepoResult<()>) {
        if let Err(err) = result {
            warn!("event=state_save module=list status=error record={record} error={err}");
            self.notices.push(ServiceNotice::SaveFailed {
                record,
                message: err.to_string(),
            });
        }
    }

    fn record_load_failure(&mut self, record: &'static str, err: &dyn Display) {
        push_load_failure(&mut self.notices, record, err);
    }
}

fn load_categories<K: KvStore>(
    repo: &StateRepository<K>,
    notices: &mut Vec<ServiceNotice>,
) -> CategoryStore {
    match repo.load_categories() {
        Ok(StoredList {
            status: StorageStatus::NeverInitialized,
            ..
        }) => CategoryStore::default(),
        Ok(stored) => match CategoryStore::new(stored.records) {
            Ok(store) => store,
            Err(err) => {
                push_load_failure(notices, CATEGORIES_KEY, &err);
                CategoryStore::default()
            }
        },
        Err(err) => {
            push_load_failure(notices, CATEGORIES_KEY, &err);
            CategoryStore::default()
        }
    }
}

fn load_items<K: KvStore>(
    repo: &StateRepository<K>,
    policy: SeedPolicy,
    notices: &mut Vec<ServiceNotice>,
) -> (ItemStore, bool) {
    match repo.load_items() {
        Ok(stored) => {
            push_dropped_rows(notices, ITEMS_KEY, stored.skipped);
            let seed = match stored.status {
                StorageStatus::NeverInitialized => true,
                StorageStatus::InitializedEmpty => policy == SeedPolicy::ReseedWhenEmpty,
                StorageStatus::InitializedNonEmpty => false,
            };
            if seed {
                (ItemStore::from_items(demo_items()), true)
            } else {
                (ItemStore::from_items(stored.records), false)
            }
        }
        Err(err) => {
            push_load_failure(notices, ITEMS_KEY, &err);
            (ItemStore::new(), false)
        }
    }
}

fn push_dropped_rows(notices: &mut Vec<ServiceNotice>, record: &'static str, reasons: Vec<String>) {
    if reasons.is_empty() {
        return;
    }
    warn!(
        "event=state_load module=list status=repaired record={record} dropped_rows={}",
        reasons.len()
    );
    notices.push(ServiceNotice::RowsDropped { record, reasons });
}

fn push_load_failure(notices: &mut Vec<ServiceNotice>, record: &'static str, err: &dyn Display) {
    warn!("event=state_load module=list status=error record={record} error={err}");
    notices.push(ServiceNotice::LoadFailed {
        record,
        message: err.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::{SeedPolicy, ServiceConfig, ShoppingListService};
    use crate::repo::kv_store::MemoryKvStore;
    use crate::repo::state_repo::ITEMS_KEY;

    #[test]
    fn first_load_seeds_and_persists_demo_items() {
        let kv = MemoryKvStore::new();
        let service = ShoppingListService::load(&kv);
        assert_eq!(service.items().len(), 3);
        assert_eq!(service.selected_category(), "食品");
        assert!(kv.get_text(ITEMS_KEY).unwrap().contains("牛乳"));
    }

    #[test]
    fn default_policy_keeps_a_cleared_list_empty() {
        let kv = MemoryKvStore::new();
        let mut service = ShoppingListService::load(&kv);
        service.clear_all();
        drop(service);

        let reloaded = ShoppingListService::load(&kv);
        assert!(reloaded.items().is_empty());
    }

    #[test]
    fn legacy_policy_reseeds_after_clear() {
        let kv = MemoryKvStore::new();
        let config = ServiceConfig {
            seed_policy: SeedPolicy::ReseedWhenEmpty,
        };
        let mut service = ShoppingListService::load_with_config(&kv, config);
        service.clear_all();
        drop(service);

        let reloaded = ShoppingListService::load_with_config(&kv, config);
        assert_eq!(reloaded.items().len(), 3);
    }

    #[test]
    fn fresh_keys_skip_existing_keys() {
        let kv = MemoryKvStore::new();
        let mut service = ShoppingListService::load(&kv);
        let a = service.add_item("a", "食品", 1).unwrap();
        let b = service.add_item("b", "食品", 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(service.items()[0].key, b);
    }
}
