//! Achievement flags.
//!
//! # Invariants
//! - Flags are one-way: `unlock` never clears a flag and nothing else writes them.

use serde::{Deserialize, Serialize};

/// Named achievement in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    FirstTask,
    StudyStreak,
    GoalAchiever,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 3] = [Self::FirstTask, Self::StudyStreak, Self::GoalAchiever];

    /// Persisted flag name.
    pub fn key(self) -> &'static str {
        match self {
            Self::FirstTask => "firstTask",
            Self::StudyStreak => "studyStreak",
            Self::GoalAchiever => "goalAchiever",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstTask => "First Task",
            Self::StudyStreak => "Study Streak",
            Self::GoalAchiever => "Goal Achiever",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstTask => "Complete your first study task",
            Self::StudyStreak => "Complete tasks for 7 days straight",
            Self::GoalAchiever => "Meet your weekly study goal",
        }
    }
}

/// Persisted unlock state for every achievement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievements {
    #[serde(default)]
    first_task: bool,
    #[serde(default)]
    study_streak: bool,
    #[serde(default)]
    goal_achiever: bool,
}

impl Achievements {
    pub fn is_unlocked(&self, kind: AchievementKind) -> bool {
        match kind {
            AchievementKind::FirstTask => self.first_task,
            AchievementKind::StudyStreak => self.study_streak,
            AchievementKind::GoalAchiever => self.goal_achiever,
        }
    }

    /// Sets the flag. Returns `true` only when it was previously locked.
    pub fn unlock(&mut self, kind: AchievementKind) -> bool {
        let flag = match kind {
            AchievementKind::FirstTask => &mut self.first_task,
            AchievementKind::StudyStreak => &mut self.study_streak,
            AchievementKind::GoalAchiever => &mut self.goal_achiever,
        };
        let newly_unlocked = !*flag;
        *flag = true;
        newly_unlocked
    }

    pub fn unlocked_count(&self) -> usize {
        self.iter().filter(|(_, unlocked)| *unlocked).count()
    }

    /// Lists `(kind, unlocked)` in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (AchievementKind, bool)> + '_ {
        AchievementKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.is_unlocked(kind)))
    }
}
