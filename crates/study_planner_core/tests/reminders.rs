use chrono::{Duration, NaiveDate, NaiveDateTime};
use study_planner_core::db::open_db;
use study_planner_core::service::reminder::REMINDER_TITLE;
use study_planner_core::{
    reminder_summary, ManualClock, MemoryKeyValueStore, Notifier, Planner, PlannerConfig,
    ReminderScheduler, ReminderSummary, SqliteKeyValueStore, Subject, Task, TaskDraft,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

#[derive(Default)]
struct RecordingNotifier {
    denied: bool,
    sent: Vec<(String, String)>,
}

impl Notifier for RecordingNotifier {
    fn is_permitted(&self) -> bool {
        !self.denied
    }

    fn notify(&mut self, title: &str, body: &str) {
        self.sent.push((title.to_string(), body.to_string()));
    }
}

fn task(title: &str, due: NaiveDate) -> Task {
    Task::from_draft(&TaskDraft::new(title, Subject::History, due), at(2026, 10, 1, 8)).unwrap()
}

#[test]
fn summary_counts_overdue_and_due_today_incomplete_tasks() {
    let now = at(2026, 10, 17, 9);
    let mut done = task("Done", date(2026, 10, 10));
    done.toggle_completion(now);
    let tasks = vec![
        done,
        task("Late", date(2026, 10, 15)),
        task("Later", date(2026, 10, 16)),
        task("Today", date(2026, 10, 17)),
        task("Tomorrow", date(2026, 10, 18)),
    ];

    let summary = reminder_summary(&tasks, now);
    assert_eq!(
        summary,
        ReminderSummary {
            overdue: 2,
            due_today: 1
        }
    );
    assert_eq!(
        summary.message().as_deref(),
        Some("You have 2 overdue task(s)!")
    );
    assert_eq!(ReminderSummary::default().message(), None);
}

#[test]
fn scheduler_runs_once_per_interval() {
    let start = at(2026, 10, 17, 9);
    let tasks = vec![task("Late", date(2026, 10, 15))];
    let mut scheduler = ReminderScheduler::from_secs(60);
    let mut notifier = RecordingNotifier::default();

    assert!(scheduler.tick(&tasks, start, &mut notifier).is_some());
    assert!(scheduler
        .tick(&tasks, start + Duration::seconds(30), &mut notifier)
        .is_none());
    assert!(scheduler
        .tick(&tasks, start + Duration::seconds(60), &mut notifier)
        .is_some());

    assert_eq!(notifier.sent.len(), 2);
    assert_eq!(notifier.sent[0].0, REMINDER_TITLE);
    assert_eq!(notifier.sent[0].1, "You have 1 overdue task(s)!");
    assert_eq!(scheduler.last_run(), Some(start + Duration::seconds(60)));
}

#[test]
fn scheduler_respects_permission_and_quiet_days() {
    let now = at(2026, 10, 17, 9);
    let mut scheduler = ReminderScheduler::from_secs(60);

    let mut denied = RecordingNotifier {
        denied: true,
        ..RecordingNotifier::default()
    };
    let summary = scheduler
        .tick(&[task("Late", date(2026, 10, 15))], now, &mut denied)
        .unwrap();
    assert_eq!(summary.overdue, 1);
    assert!(denied.sent.is_empty());

    let mut allowed = RecordingNotifier::default();
    let summary = scheduler
        .tick(
            &[task("Today", date(2026, 10, 17))],
            now + Duration::minutes(1),
            &mut allowed,
        )
        .unwrap();
    assert_eq!(summary.overdue, 0);
    assert_eq!(summary.due_today, 1);
    assert!(allowed.sent.is_empty());
}

#[test]
fn planner_checks_reminders_with_its_clock() {
    let clock = ManualClock::new(at(2026, 10, 17, 9));
    let mut planner =
        Planner::load(MemoryKeyValueStore::new(), &clock, PlannerConfig::default()).unwrap();
    planner
        .add_task(&TaskDraft::new("Timeline", Subject::History, date(2026, 10, 16)))
        .unwrap();

    let mut scheduler = ReminderScheduler::from_secs(planner.config().reminder_interval_secs);
    let mut notifier = RecordingNotifier::default();

    assert_eq!(planner.reminder_summary().overdue, 1);
    assert!(planner.check_reminders(&mut scheduler, &mut notifier).is_some());
    assert!(planner.check_reminders(&mut scheduler, &mut notifier).is_none());

    clock.advance(Duration::minutes(1));
    assert!(planner.check_reminders(&mut scheduler, &mut notifier).is_some());
    assert_eq!(notifier.sent.len(), 2);
}

#[test]
fn reloaded_planner_sees_tasks_written_by_another_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");
    let clock = ManualClock::new(at(2026, 10, 17, 9));
    let watcher_conn = open_db(&path).unwrap();
    let load = || {
        Planner::load(
            SqliteKeyValueStore::new(&watcher_conn),
            &clock,
            PlannerConfig::default(),
        )
        .unwrap()
    };

    let mut scheduler = ReminderScheduler::from_secs(60);
    let mut notifier = RecordingNotifier::default();
    let summary = load()
        .check_reminders(&mut scheduler, &mut notifier)
        .unwrap();
    assert_eq!(summary.overdue, 0);

    {
        let writer_conn = open_db(&path).unwrap();
        let mut writer = Planner::load(
            SqliteKeyValueStore::new(&writer_conn),
            &clock,
            PlannerConfig::default(),
        )
        .unwrap();
        writer
            .add_task(&TaskDraft::new("Essay", Subject::English, date(2026, 10, 15)))
            .unwrap();
    }

    clock.advance(Duration::minutes(1));
    let summary = load()
        .check_reminders(&mut scheduler, &mut notifier)
        .unwrap();
    assert_eq!(summary.overdue, 1);
    assert_eq!(notifier.sent.len(), 1);
    assert_eq!(notifier.sent[0].1, "You have 1 overdue task(s)!");
}
