//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list, category, template and reminder use cases to Dart via FRB.
//! - Flatten core results into plain envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the store, runs one use case and drops the session;
//!   no list state is cached between calls.
//! - Sessions are serialized process-wide.
//! - Non-fatal storage problems are returned as `notices`, never as errors.

use kaimono_core::db::open_db;
use kaimono_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, Item, NotificationService, Placement, ReminderScheduler, ReminderText,
    SchedulerError, Section, ServiceNotice, ShoppingListService, SqliteKvStore, TemplateItem,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const LIST_DB_FILE_NAME: &str = "kaimono.sqlite3";
static LIST_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
// Sessions rewrite whole records; one at a time per process.
static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub key: String,
    pub label: String,
    pub category: String,
    pub quantity: u32,
    /// `true` for the to-buy view, `false` for candidates.
    pub added: bool,
}

/// One category group of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub category: String,
    pub color: String,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateView {
    pub id: String,
    pub label: String,
    pub category: String,
    pub default_quantity: u32,
}

/// Everything the list screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSnapshot {
    /// Whether the store could be opened at all.
    pub ok: bool,
    pub to_buy: Vec<SectionView>,
    pub candidates: Vec<SectionView>,
    pub categories: Vec<CategoryView>,
    /// Category preselected in the add-item form.
    pub selected_category: String,
    /// Names used by items but missing from `categories`.
    pub unreferenced_categories: Vec<String>,
    /// Non-fatal load/save problems to show as a toast.
    pub notices: Vec<String>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation was applied.
    pub ok: bool,
    /// Item key or template id the operation produced or touched.
    pub key: Option<String>,
    pub notices: Vec<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, key: Option<String>, notices: Vec<String>) -> Self {
        Self {
            ok: true,
            key,
            notices,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, notices: Vec<String>) -> Self {
        Self {
            ok: false,
            key: None,
            notices,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateListResponse {
    pub ok: bool,
    pub templates: Vec<TemplateView>,
    pub notices: Vec<String>,
    pub message: String,
}

/// Daily reminder the platform should have scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    pub hour: u8,
    pub minute: u8,
    pub title: String,
    pub body: String,
}

/// Reminder preferences plus the schedule Dart must apply.
///
/// Dart cancels every pending reminder, then schedules `plan` when present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderResponse {
    pub ok: bool,
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
    pub plan: Option<ReminderPlan>,
    pub notices: Vec<String>,
    pub message: String,
}

/// Loads the list screen state.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - First run seeds demo items.
#[flutter_rust_bridge::frb(sync)]
pub fn list_snapshot() -> ListSnapshot {
    match with_list_service(|service| Ok(snapshot_of(service))) {
        Ok((mut snapshot, notices)) => {
            snapshot.notices = notices;
            snapshot
        }
        Err(message) => ListSnapshot {
            message,
            ..ListSnapshot::default()
        },
    }
}

/// Adds a to-buy item at the top of the list.
#[flutter_rust_bridge::frb(sync)]
pub fn list_add_item(label: String, category: String, quantity: u32) -> ActionResponse {
    action("list_add_item", |service| {
        let key = service
            .add_item(&label, &category, quantity)
            .map_err(|err| err.to_string())?;
        Ok(("Item added.".to_string(), Some(key)))
    })
}

/// Moves an item between the to-buy and candidate views.
#[flutter_rust_bridge::frb(sync)]
pub fn list_toggle_item(key: String) -> ActionResponse {
    action("list_toggle_item", |service| {
        match service.toggle_added(&key) {
            Some(Placement::ToBuy) => Ok(("Moved to list.".to_string(), Some(key.clone()))),
            Some(Placement::Candidate) => {
                Ok(("Moved to candidates.".to_string(), Some(key.clone())))
            }
            None => Err(format!("item not found: {key}")),
        }
    })
}

/// Overwrites quantity (clamped to >= 1) and category of an item.
#[flutter_rust_bridge::frb(sync)]
pub fn list_update_item(key: String, quantity: u32, category: String) -> ActionResponse {
    action("list_update_item", |service| {
        service
            .update_item(&key, quantity, &category)
            .map_err(|err| err.to_string())?;
        Ok(("Item updated.".to_string(), Some(key.clone())))
    })
}

/// Adds one to an item's quantity.
#[flutter_rust_bridge::frb(sync)]
pub fn list_increment_quantity(key: String) -> ActionResponse {
    action("list_increment_quantity", |service| {
        let quantity = service
            .increment_quantity(&key)
            .map_err(|err| err.to_string())?;
        Ok((format!("quantity={quantity}"), Some(key.clone())))
    })
}

/// Subtracts one from an item's quantity, stopping at 1.
#[flutter_rust_bridge::frb(sync)]
pub fn list_decrement_quantity(key: String) -> ActionResponse {
    action("list_decrement_quantity", |service| {
        let quantity = service
            .decrement_quantity(&key)
            .map_err(|err| err.to_string())?;
        Ok((format!("quantity={quantity}"), Some(key.clone())))
    })
}

/// Removes one item. Dart asks the user first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_delete_item(key: String) -> ActionResponse {
    action("list_delete_item", |service| {
        service
            .delete_item(&key)
            .map(|_| ("Item deleted.".to_string(), Some(key.clone())))
            .ok_or_else(|| format!("item not found: {key}"))
    })
}

/// Removes every item. Dart asks the user first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_clear_all() -> ActionResponse {
    action("list_clear_all", |service| {
        service.clear_all();
        Ok(("List cleared.".to_string(), None))
    })
}

/// Appends a category with a display color.
#[flutter_rust_bridge::frb(sync)]
pub fn category_add(name: String, color: String) -> ActionResponse {
    action("category_add", |service| {
        service
            .add_category(&name, &color)
            .map_err(|err| err.to_string())?;
        Ok(("Category added.".to_string(), Some(name.trim().to_string())))
    })
}

/// Removes a category. Items keep the name and render with the fallback color.
#[flutter_rust_bridge::frb(sync)]
pub fn category_remove(name: String) -> ActionResponse {
    action("category_remove", |service| {
        service
            .remove_category(&name)
            .map_err(|err| err.to_string())?;
        Ok(("Category removed.".to_string(), Some(name.clone())))
    })
}

/// Replaces the category order. `names` must list every category once.
#[flutter_rust_bridge::frb(sync)]
pub fn category_reorder(names: Vec<String>) -> ActionResponse {
    action("category_reorder", |service| {
        let mut reordered = Vec::with_capacity(names.len());
        for name in &names {
            let color = service.category_color(name).to_string();
            reordered.push(Category::new(name.clone(), color));
        }
        service
            .reorder_categories(reordered)
            .map_err(|err| err.to_string())?;
        Ok(("Categories reordered.".to_string(), None))
    })
}

/// Lists saved templates, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn template_list() -> TemplateListResponse {
    match with_list_service(|service| {
        Ok(service.templates().iter().map(to_template_view).collect::<Vec<_>>())
    }) {
        Ok((templates, notices)) => TemplateListResponse {
            ok: true,
            templates,
            notices,
            message: String::new(),
        },
        Err(message) => TemplateListResponse {
            message,
            ..TemplateListResponse::default()
        },
    }
}

/// Saves a template.
#[flutter_rust_bridge::frb(sync)]
pub fn template_add(label: String, category: String, default_quantity: u32) -> ActionResponse {
    action("template_add", |service| {
        let id = service
            .add_template(&label, &category, default_quantity)
            .map_err(|err| err.to_string())?;
        Ok(("Template saved.".to_string(), Some(id)))
    })
}

/// Deletes a template. Items created from it are untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn template_delete(id: String) -> ActionResponse {
    action("template_delete", |service| {
        service
            .delete_template(&id)
            .map_err(|err| err.to_string())?;
        Ok(("Template deleted.".to_string(), Some(id.clone())))
    })
}

/// Adds a template to the to-buy list, merging into an exact match.
///
/// `key` is the merged or created item key.
#[flutter_rust_bridge::frb(sync)]
pub fn template_apply(id: String) -> ActionResponse {
    action("template_apply", |service| {
        let application = service
            .apply_template(&id)
            .map_err(|err| err.to_string())?;
        let message = match &application {
            kaimono_core::TemplateApplication::Merged { quantity, .. } => {
                format!("Merged; quantity={quantity}")
            }
            kaimono_core::TemplateApplication::Created { .. } => "Added to list.".to_string(),
        };
        Ok((message, Some(application.key().to_string())))
    })
}

/// Reads reminder preferences and the schedule they imply.
///
/// Dart applies `plan` on startup to resync the platform scheduler.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_get() -> ReminderResponse {
    with_reminder_service(|service| {
        service.resync();
        Ok(())
    })
}

/// Turns the daily reminder on or off.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_set_enabled(enabled: bool) -> ReminderResponse {
    with_reminder_service(|service| {
        service.set_enabled(enabled);
        Ok(())
    })
}

/// Changes the reminder time of day.
///
/// # FFI contract
/// - `hour` in `0..24`, `minute` in `0..60`; anything else returns `ok=false`
///   and changes nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_set_time(hour: u8, minute: u8) -> ReminderResponse {
    with_reminder_service(|service| service.set_time(hour, minute).map_err(|err| err.to_string()))
}

/// Scheduler that records the reminder Dart should register.
#[derive(Debug, Default)]
struct PlannedScheduler {
    plan: Option<ReminderPlan>,
}

impl ReminderScheduler for PlannedScheduler {
    fn cancel_all(&mut self) -> Result<(), SchedulerError> {
        self.plan = None;
        Ok(())
    }

    fn schedule_daily(
        &mut self,
        hour: u8,
        minute: u8,
        title: &str,
        body: &str,
    ) -> Result<(), SchedulerError> {
        self.plan = Some(ReminderPlan {
            hour,
            minute,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

fn session_guard() -> MutexGuard<'static, ()> {
    SESSION_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn resolve_list_db_path() -> PathBuf {
    LIST_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("KAIMONO_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LIST_DB_FILE_NAME)
        })
        .clone()
}

fn with_list_service<T>(
    f: impl FnOnce(&mut ShoppingListService<SqliteKvStore<'_>>) -> Result<T, String>,
) -> Result<(T, Vec<String>), String> {
    let _guard = session_guard();
    let db_path = resolve_list_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("list DB open failed: {err}"))?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| format!("list store init failed: {err}"))?;
    let mut service = ShoppingListService::load(kv);
    let value = f(&mut service);
    let notices = notice_messages(service.take_notices());
    value.map(|value| (value, notices))
}

fn action(
    operation: &str,
    f: impl FnOnce(
        &mut ShoppingListService<SqliteKvStore<'_>>,
    ) -> Result<(String, Option<String>), String>,
) -> ActionResponse {
    let _guard = session_guard();
    let db_path = resolve_list_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
            return ActionResponse::failure(format!("{operation} failed: {err}"), Vec::new());
        }
    };
    let kv = match SqliteKvStore::try_new(&conn) {
        Ok(kv) => kv,
        Err(err) => {
            return ActionResponse::failure(format!("{operation} failed: {err}"), Vec::new());
        }
    };
    let mut service = ShoppingListService::load(kv);
    let result = f(&mut service);
    let notices = notice_messages(service.take_notices());
    match result {
        Ok((message, key)) => ActionResponse::success(message, key, notices),
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}"), notices),
    }
}

fn with_reminder_service(
    f: impl FnOnce(&mut NotificationService<SqliteKvStore<'_>, PlannedScheduler>) -> Result<(), String>,
) -> ReminderResponse {
    let _guard = session_guard();
    let db_path = resolve_list_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return ReminderResponse {
                message: format!("reminder DB open failed: {err}"),
                ..ReminderResponse::default()
            };
        }
    };
    let kv = match SqliteKvStore::try_new(&conn) {
        Ok(kv) => kv,
        Err(err) => {
            return ReminderResponse {
                message: format!("reminder store init failed: {err}"),
                ..ReminderResponse::default()
            };
        }
    };
    let mut service =
        NotificationService::load(kv, PlannedScheduler::default(), ReminderText::default());
    let result = f(&mut service);
    let notices = notice_messages(service.take_notices());
    let settings = service.settings();
    let plan = service.into_scheduler().plan;
    let (ok, message) = match result {
        Ok(()) => (true, String::new()),
        Err(err) => (false, err),
    };
    ReminderResponse {
        ok,
        enabled: settings.enabled,
        hour: settings.hour,
        minute: settings.minute,
        plan,
        notices,
        message,
    }
}

fn snapshot_of(service: &ShoppingListService<SqliteKvStore<'_>>) -> ListSnapshot {
    ListSnapshot {
        ok: true,
        to_buy: service
            .sections(Placement::ToBuy)
            .into_iter()
            .map(to_section_view)
            .collect(),
        candidates: service
            .sections(Placement::Candidate)
            .into_iter()
            .map(to_section_view)
            .collect(),
        categories: service
            .categories()
            .iter()
            .map(|category| CategoryView {
                name: category.name.clone(),
                color: category.color.clone(),
            })
            .collect(),
        selected_category: service.selected_category().to_string(),
        unreferenced_categories: service.unreferenced_categories(),
        notices: Vec::new(),
        message: format!("{} item(s).", service.items().len()),
    }
}

fn notice_messages(notices: Vec<ServiceNotice>) -> Vec<String> {
    notices.iter().map(ToString::to_string).collect()
}

fn to_section_view(section: Section) -> SectionView {
    SectionView {
        category: section.category,
        color: section.color,
        items: section.items.into_iter().map(to_item_view).collect(),
    }
}

fn to_item_view(item: Item) -> ItemView {
    ItemView {
        key: item.key,
        label: item.label,
        category: item.category,
        quantity: item.quantity,
        added: item.added,
    }
}

fn to_template_view(template: &TemplateItem) -> TemplateView {
    TemplateView {
        id: template.id.clone(),
        label: template.label.clone(),
        category: template.category.clone(),
        default_quantity: template.default_quantity,
    }
}
