use kaimono_core::model::notification::NotificationValueError;
use kaimono_core::repo::state_repo::{NOTIFICATION_ENABLED_KEY, NOTIFICATION_TIME_KEY};
use kaimono_core::{
    KvStore, MemoryKvStore, NotificationService, ReminderScheduler, ReminderText, SchedulerError,
    ServiceNotice,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    CancelAll,
    Daily { hour: u8, minute: u8, title: String },
}

#[derive(Default)]
struct RecordingScheduler {
    calls: Vec<Call>,
    fail_schedule: bool,
}

impl ReminderScheduler for RecordingScheduler {
    fn cancel_all(&mut self) -> Result<(), SchedulerError> {
        self.calls.push(Call::CancelAll);
        Ok(())
    }

    fn schedule_daily(
        &mut self,
        hour: u8,
        minute: u8,
        title: &str,
        _body: &str,
    ) -> Result<(), SchedulerError> {
        if self.fail_schedule {
            return Err(SchedulerError("permission denied".to_string()));
        }
        self.calls.push(Call::Daily {
            hour,
            minute,
            title: title.to_string(),
        });
        Ok(())
    }
}

#[test]
fn defaults_apply_when_nothing_is_stored() {
    let kv = MemoryKvStore::new();
    let service = NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    let settings = service.settings();
    assert!(!settings.enabled);
    assert_eq!((settings.hour, settings.minute), (18, 0));
    assert!(service.scheduler().calls.is_empty());
}

#[test]
fn enabling_cancels_then_schedules_one_reminder() {
    let kv = MemoryKvStore::new();
    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());

    service.set_enabled(true);
    service.set_time(7, 30).unwrap();

    assert_eq!(
        service.scheduler().calls,
        vec![
            Call::CancelAll,
            Call::Daily {
                hour: 18,
                minute: 0,
                title: "買い物リスト".to_string()
            },
            Call::CancelAll,
            Call::Daily {
                hour: 7,
                minute: 30,
                title: "買い物リスト".to_string()
            },
        ]
    );
    assert_eq!(kv.get_text(NOTIFICATION_ENABLED_KEY).as_deref(), Some("true"));
    assert_eq!(
        kv.get_text(NOTIFICATION_TIME_KEY).as_deref(),
        Some("1970-01-01T07:30:00.000Z")
    );
}

#[test]
fn disabling_only_cancels() {
    let kv = MemoryKvStore::new();
    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    service.set_enabled(false);
    service.set_time(9, 0).unwrap();
    assert_eq!(
        service.into_scheduler().calls,
        vec![Call::CancelAll, Call::CancelAll]
    );
}

#[test]
fn preferences_reload_ignoring_the_stored_date() {
    let kv = MemoryKvStore::new();
    kv.set(NOTIFICATION_ENABLED_KEY, b"true").unwrap();
    kv.set(NOTIFICATION_TIME_KEY, b"2025-03-04T21:05:00.000Z")
        .unwrap();

    let service = NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    let settings = service.settings();
    assert!(settings.enabled);
    assert_eq!((settings.hour, settings.minute), (21, 5));
}

#[test]
fn invalid_time_is_rejected_without_side_effects() {
    let kv = MemoryKvStore::new();
    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    let err = service.set_time(24, 0).unwrap_err();
    assert_eq!(err, NotificationValueError::InvalidTime { hour: 24, minute: 0 });
    assert!(service.scheduler().calls.is_empty());
    assert!(kv.get_text(NOTIFICATION_TIME_KEY).is_none());
}

#[test]
fn scheduler_failure_becomes_a_notice() {
    let kv = MemoryKvStore::new();
    let scheduler = RecordingScheduler {
        fail_schedule: true,
        ..RecordingScheduler::default()
    };
    let mut service = NotificationService::load(&kv, scheduler, ReminderText::default());
    service.set_enabled(true);

    assert!(service.settings().enabled);
    let notices = service.take_notices();
    assert!(matches!(
        notices.as_slice(),
        [ServiceNotice::ScheduleFailed { message }] if message.contains("permission denied")
    ));
}

#[test]
fn unreadable_flag_falls_back_with_notice() {
    let kv = MemoryKvStore::new();
    kv.set(NOTIFICATION_ENABLED_KEY, b"maybe").unwrap();
    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    assert!(!service.settings().enabled);
    assert!(matches!(
        service.take_notices().as_slice(),
        [ServiceNotice::LoadFailed { record, .. }] if *record == NOTIFICATION_ENABLED_KEY
    ));
}

#[test]
fn unreadable_flag_keeps_the_stored_time() {
    let kv = MemoryKvStore::new();
    kv.set(NOTIFICATION_ENABLED_KEY, b"garbage").unwrap();
    kv.set(NOTIFICATION_TIME_KEY, b"1970-01-01T07:30:00.000Z")
        .unwrap();

    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    let settings = service.settings();
    assert!(!settings.enabled);
    assert_eq!((settings.hour, settings.minute), (7, 30));
    assert!(matches!(
        service.take_notices().as_slice(),
        [ServiceNotice::LoadFailed { record, .. }] if *record == NOTIFICATION_ENABLED_KEY
    ));

    service.set_enabled(true);
    assert_eq!(
        service.scheduler().calls.last(),
        Some(&Call::Daily {
            hour: 7,
            minute: 30,
            title: "買い物リスト".to_string()
        })
    );
    assert_eq!(
        kv.get_text(NOTIFICATION_TIME_KEY).as_deref(),
        Some("1970-01-01T07:30:00.000Z")
    );
}

#[test]
fn unreadable_time_keeps_the_stored_flag() {
    let kv = MemoryKvStore::new();
    kv.set(NOTIFICATION_ENABLED_KEY, b"true").unwrap();
    kv.set(NOTIFICATION_TIME_KEY, b"25:99").unwrap();

    let mut service =
        NotificationService::load(&kv, RecordingScheduler::default(), ReminderText::default());
    let settings = service.settings();
    assert!(settings.enabled);
    assert_eq!((settings.hour, settings.minute), (18, 0));
    assert!(matches!(
        service.take_notices().as_slice(),
        [ServiceNotice::LoadFailed { record, .. }] if *record == NOTIFICATION_TIME_KEY
    ));
}
