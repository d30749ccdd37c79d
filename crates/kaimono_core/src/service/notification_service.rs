//! Daily reminder preferences and scheduler sync.
//!
//! # Responsibility
//! - Persist the enabled flag and time-of-day write-through.
//! - Keep the platform scheduler in line with the stored preferences.
//!
//! # Invariants
//! - Every preference change runs `cancel_all` before any `schedule_daily`,
//!   so at most one reminder is ever scheduled.
//! - Scheduler and storage failures never revert the in-memory settings.

use crate::model::notification::{validate_time_of_day, NotificationSettings, NotificationValueError};
use crate::repo::kv_store::KvStore;
use crate::repo::state_repo::{
    RepoError, RepoResult, StateRepository, NOTIFICATION_ENABLED_KEY, NOTIFICATION_TIME_KEY,
};
use crate::service::notice::ServiceNotice;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a platform scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerError(pub String);

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for SchedulerError {}

/// Platform notification capability.
pub trait ReminderScheduler {
    fn cancel_all(&mut self) -> Result<(), SchedulerError>;
    fn schedule_daily(
        &mut self,
        hour: u8,
        minute: u8,
        title: &str,
        body: &str,
    ) -> Result<(), SchedulerError>;
}

/// Title and body used for the daily reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderText {
    pub title: String,
    pub body: String,
}

impl Default for ReminderText {
    fn default() -> Self {
        Self {
            title: "買い物リスト".to_string(),
            body: "買うものを確認しましょう".to_string(),
        }
    }
}

/// Reminder preferences bound to storage and a scheduler.
pub struct NotificationService<K: KvStore, S: ReminderScheduler> {
    repo: StateRepository<K>,
    scheduler: S,
    text: ReminderText,
    settings: NotificationSettings,
    notices: Vec<ServiceNotice>,
}

impl<K: KvStore, S: ReminderScheduler> NotificationService<K, S> {
    /// Loads stored preferences.
    ///
    /// Flag and time load independently: an unreadable value falls back to
    /// its own default and queues one `LoadFailed` notice for that key.
    /// Loading does not touch the scheduler.
    pub fn load(kv: K, scheduler: S, text: ReminderText) -> Self {
        let repo = StateRepository::new(kv);
        let mut notices = Vec::new();
        let mut settings = NotificationSettings::default();

        match repo.load_notification_enabled() {
            Ok(Some(enabled)) => settings.enabled = enabled,
            Ok(None) => {}
            Err(err) => push_load_failure(&mut notices, NOTIFICATION_ENABLED_KEY, &err),
        }
        match repo.load_notification_time() {
            Ok(Some((hour, minute))) => {
                settings.hour = hour;
                settings.minute = minute;
            }
            Ok(None) => {}
            Err(err) => push_load_failure(&mut notices, NOTIFICATION_TIME_KEY, &err),
        }

        Self {
            repo,
            scheduler,
            text,
            settings,
            notices,
        }
    }

    pub fn settings(&self) -> NotificationSettings {
        self.settings
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn into_scheduler(self) -> S {
        self.scheduler
    }

    pub fn take_notices(&mut self) -> Vec<ServiceNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Turns the daily reminder on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        let result = self.repo.save_notification_enabled(enabled);
        self.record_save_result(NOTIFICATION_ENABLED_KEY, result);
        info!("event=reminder_toggle module=reminder status=ok enabled={enabled}");
        self.resync();
    }

    /// Changes the reminder time.
    ///
    /// # Errors
    /// - `InvalidTime` when `hour >= 24` or `minute >= 60`; nothing changes.
    pub fn set_time(&mut self, hour: u8, minute: u8) -> Result<(), NotificationValueError> {
        validate_time_of_day(hour, minute)?;
        self.settings.hour = hour;
        self.settings.minute = minute;
        let result = self.repo.save_notification_time(hour, minute);
        self.record_save_result(NOTIFICATION_TIME_KEY, result);
        info!("event=reminder_time module=reminder status=ok time={hour:02}:{minute:02}");
        self.resync();
        Ok(())
    }

    /// Cancels all reminders, then schedules one if enabled.
    pub fn resync(&mut self) {
        if let Err(err) = self.scheduler.cancel_all() {
            self.record_schedule_failure(err);
            return;
        }
        if !self.settings.enabled {
            return;
        }
        let NotificationSettings { hour, minute, .. } = self.settings;
        if let Err(err) =
            self.scheduler
                .schedule_daily(hour, minute, &self.text.title, &self.text.body)
        {
            self.record_schedule_failure(err);
        }
    }

    fn record_save_result(&mut self, record: &'static str, result: RepoResult<()>) {
        if let Err(err) = result {
            warn!("event=state_save module=reminder status=error record={record} error={err}");
            self.notices.push(ServiceNotice::SaveFailed {
                record,
                message: err.to_string(),
            });
        }
    }

    fn record_schedule_failure(&mut self, err: SchedulerError) {
        warn!("event=reminder_schedule module=reminder status=error error={err}");
        self.notices.push(ServiceNotice::ScheduleFailed {
            message: err.to_string(),
        });
    }
}

fn push_load_failure(notices: &mut Vec<ServiceNotice>, record: &'static str, err: &RepoError) {
    warn!("event=reminder_load module=reminder status=error record={record} error={err}");
    notices.push(ServiceNotice::LoadFailed {
        record,
        message: err.to_string(),
    });
}
