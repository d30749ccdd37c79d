//! Core domain logic for the kaimono shopping list.
//! This crate is the single source of truth for list invariants; UI shells
//! call into it and render what it returns.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{default_categories, Category, PRESET_COLORS};
pub use model::item::{Item, ItemKey, Placement};
pub use model::notification::NotificationSettings;
pub use model::template::{TemplateId, TemplateItem};
pub use repo::kv_store::{KvError, KvResult, KvStore, MemoryKvStore, SqliteKvStore};
pub use repo::state_repo::{RepoError, RepoResult, StateRepository, StorageStatus};
pub use service::confirm::Confirm;
pub use service::list_service::{
    ListResult, ListServiceError, SeedPolicy, ServiceConfig, ShoppingListService,
    TemplateApplication,
};
pub use service::notice::ServiceNotice;
pub use service::notification_service::{
    NotificationService, ReminderScheduler, ReminderText, SchedulerError,
};
pub use store::category_store::{CategoryError, CategoryStore};
pub use store::item_store::{ItemError, ItemStore};
pub use store::section::{group_sections, unreferenced_category_names, Section};
pub use store::template_store::{TemplateError, TemplateStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
