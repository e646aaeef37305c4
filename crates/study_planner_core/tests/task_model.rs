use chrono::{NaiveDate, NaiveDateTime};
use study_planner_core::{
    AchievementKind, Achievements, ActivityLog, Priority, Subject, Task, TaskDraft, TaskPatch,
    TaskValidationError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

#[test]
fn task_from_draft_sets_defaults() {
    let draft = TaskDraft::new("  Read Ch.1 ", Subject::Math, date(2026, 10, 18))
        .with_priority(Priority::High)
        .with_estimated_hours(2.0);
    let task = Task::from_draft(&draft, at(2026, 10, 17, 9)).unwrap();

    assert!(!task.id.is_empty());
    assert_eq!(task.title, "Read Ch.1");
    assert_eq!(task.description, "");
    assert_eq!(task.subject, Subject::Math);
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.estimated_hours, 2.0);
    assert!(!task.completed);
    assert_eq!(task.completed_at, None);
    assert_eq!(task.created_at, at(2026, 10, 17, 9));
}

#[test]
fn draft_rejects_missing_required_fields() {
    let due = date(2026, 10, 18);

    let blank_title = TaskDraft::new("   ", Subject::Math, due);
    assert_eq!(blank_title.validate(), Err(TaskValidationError::MissingTitle));

    let no_subject = TaskDraft {
        title: "Essay".to_string(),
        due_date: Some(due),
        ..TaskDraft::default()
    };
    assert_eq!(no_subject.validate(), Err(TaskValidationError::MissingSubject));

    let no_due_date = TaskDraft {
        title: "Essay".to_string(),
        subject: Some(Subject::English),
        ..TaskDraft::default()
    };
    assert_eq!(no_due_date.validate(), Err(TaskValidationError::MissingDueDate));

    let negative_hours = TaskDraft::new("Essay", Subject::English, due).with_estimated_hours(-1.0);
    assert_eq!(
        negative_hours.validate(),
        Err(TaskValidationError::InvalidEstimatedHours(-1.0))
    );
}

#[test]
fn toggle_keeps_completion_timestamp_in_sync() {
    let draft = TaskDraft::new("Lab report", Subject::Science, date(2026, 10, 20));
    let mut task = Task::from_draft(&draft, at(2026, 10, 17, 9)).unwrap();

    assert!(task.toggle_completion(at(2026, 10, 17, 11)));
    assert_eq!(task.completed_at, Some(at(2026, 10, 17, 11)));

    assert!(!task.toggle_completion(at(2026, 10, 17, 12)));
    assert_eq!(task.completed_at, None);
}

#[test]
fn patch_merges_only_provided_fields() {
    let draft = TaskDraft::new("Lab report", Subject::Science, date(2026, 10, 20))
        .with_description("titration");
    let task = Task::from_draft(&draft, at(2026, 10, 17, 9)).unwrap();

    let patch = TaskPatch {
        priority: Some(Priority::Low),
        due_date: Some(date(2026, 10, 25)),
        ..TaskPatch::default()
    };
    let merged = patch.merged_into(&task).unwrap();

    assert_eq!(merged.id, task.id);
    assert_eq!(merged.title, "Lab report");
    assert_eq!(merged.description, "titration");
    assert_eq!(merged.priority, Priority::Low);
    assert_eq!(merged.due_date, date(2026, 10, 25));
    assert_eq!(merged.created_at, task.created_at);
    assert!(TaskPatch::default().is_empty());
}

#[test]
fn task_serialization_uses_camel_case_wire_fields() {
    let draft = TaskDraft::new("Read Ch.1", Subject::Math, date(2026, 10, 18))
        .with_priority(Priority::High)
        .with_estimated_hours(1.5);
    let task = Task::from_draft(&draft, at(2026, 10, 17, 9)).unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["title"], "Read Ch.1");
    assert_eq!(json["subject"], "Math");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["dueDate"], "2026-10-18");
    assert_eq!(json["estimatedHours"], 1.5);
    assert_eq!(json["completed"], false);
    assert!(json["completedAt"].is_null());

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn task_deserialization_fills_optional_defaults() {
    let value = serde_json::json!({
        "id": "1760000000000",
        "title": "Legacy task",
        "subject": "History",
        "priority": "medium",
        "dueDate": "2026-10-20",
        "createdAt": "2026-10-01T08:00:00"
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.id, "1760000000000");
    assert_eq!(task.description, "");
    assert_eq!(task.estimated_hours, 0.0);
    assert!(!task.completed);
    assert_eq!(task.completed_at, None);
}

#[test]
fn repair_completion_restores_invariant() {
    let draft = TaskDraft::new("Vocab", Subject::Languages, date(2026, 10, 20));
    let mut task = Task::from_draft(&draft, at(2026, 10, 17, 9)).unwrap();

    task.completed_at = Some(at(2026, 10, 17, 10));
    assert!(task.repair_completion());
    assert_eq!(task.completed_at, None);

    task.completed = true;
    assert!(task.repair_completion());
    assert_eq!(task.completed_at, Some(task.created_at));
    assert!(!task.repair_completion());
}

#[test]
fn achievements_are_one_way() {
    let mut achievements = Achievements::default();
    assert!(!achievements.is_unlocked(AchievementKind::FirstTask));

    assert!(achievements.unlock(AchievementKind::FirstTask));
    assert!(!achievements.unlock(AchievementKind::FirstTask));
    assert!(achievements.is_unlocked(AchievementKind::FirstTask));
    assert_eq!(achievements.unlocked_count(), 1);

    let json = serde_json::to_value(achievements).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"firstTask": true, "studyStreak": false, "goalAchiever": false})
    );
}

#[test]
fn activity_log_evicts_oldest_first() {
    let mut log = ActivityLog::new(20);
    for index in 0..27 {
        log.append(format!("event {index}"), at(2026, 10, 17, 9));
        assert!(log.len() <= 20);
    }

    let actions: Vec<&str> = log.entries().map(|entry| entry.action.as_str()).collect();
    assert_eq!(actions.len(), 20);
    assert_eq!(actions.first(), Some(&"event 7"));
    assert_eq!(actions.last(), Some(&"event 26"));

    let recent: Vec<&str> = log
        .recent(3)
        .into_iter()
        .map(|entry| entry.action.as_str())
        .collect();
    assert_eq!(recent, vec!["event 26", "event 25", "event 24"]);
}
