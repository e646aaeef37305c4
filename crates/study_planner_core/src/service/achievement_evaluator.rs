//! Achievement evaluation.
//!
//! # Invariants
//! - Evaluation only ever unlocks; a flag that is already set stays set even
//!   when its condition no longer holds.

use crate::model::achievement::{AchievementKind, Achievements};
use crate::model::goal::StudyGoal;
use crate::model::task::Task;
use chrono::{Duration, NaiveDate};

/// Days of consecutive completions needed for a streak, today included.
pub const STREAK_DAYS: i64 = 7;

/// Whether the condition behind `kind` currently holds.
pub fn condition_met(
    kind: AchievementKind,
    tasks: &[Task],
    goal: &StudyGoal,
    today: NaiveDate,
) -> bool {
    match kind {
        AchievementKind::FirstTask => tasks.iter().any(|task| task.completed),
        AchievementKind::GoalAchiever => goal.is_met(),
        AchievementKind::StudyStreak => has_study_streak(tasks, today),
    }
}

/// Every one of the last `STREAK_DAYS` days has at least one completion.
pub fn has_study_streak(tasks: &[Task], today: NaiveDate) -> bool {
    (0..STREAK_DAYS).all(|offset| {
        let day = today - Duration::days(offset);
        tasks.iter().any(|task| {
            task.completed
                && task
                    .completed_at
                    .is_some_and(|completed_at| completed_at.date() == day)
        })
    })
}

/// Unlocks every achievement whose condition holds.
///
/// Returns the newly unlocked kinds in catalogue order.
pub fn evaluate_achievements(
    achievements: &mut Achievements,
    tasks: &[Task],
    goal: &StudyGoal,
    today: NaiveDate,
) -> Vec<AchievementKind> {
    let mut unlocked = Vec::new();
    for kind in AchievementKind::ALL {
        if achievements.is_unlocked(kind) || !condition_met(kind, tasks, goal, today) {
            continue;
        }
        if achievements.unlock(kind) {
            unlocked.push(kind);
        }
    }
    unlocked
}
