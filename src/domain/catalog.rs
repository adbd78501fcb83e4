//! Achievement Catalog
//!
//! The catalog is read-only configuration data: every achievement the
//! product can ever award, keyed by `achievement_type`. Streak entries
//! additionally carry the exact `current_streak` value that unlocks them.
//! The catalog is constructed once and injected wherever it is needed;
//! it is not process-global state.

/// One catalog entry. Title/description/points are display data; only
/// `streak_threshold` participates in engine behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub achievement_type: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points: i32,
    /// `Some(n)` for streak achievements unlocked at exactly `current_streak == n`
    pub streak_threshold: Option<i32>,
}

/// Injected lookup table over the full achievement catalog.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    entries: Vec<CatalogEntry>,
}

impl AchievementCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The standard product catalog.
    pub fn standard() -> Self {
        Self::new(standard_entries())
    }

    /// All catalog entries, in display order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries unlocked by a habit streak, in ascending threshold order.
    pub fn streak_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.streak_threshold.is_some())
    }

    /// Look up an entry by its type key.
    pub fn find(&self, achievement_type: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.achievement_type == achievement_type)
    }
}

impl Default for AchievementCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const fn entry(
    achievement_type: &'static str,
    title: &'static str,
    description: &'static str,
    points: i32,
) -> CatalogEntry {
    CatalogEntry {
        achievement_type,
        title,
        description,
        points,
        streak_threshold: None,
    }
}

const fn streak_entry(
    achievement_type: &'static str,
    streak: i32,
    title: &'static str,
    description: &'static str,
    points: i32,
) -> CatalogEntry {
    CatalogEntry {
        achievement_type,
        title,
        description,
        points,
        streak_threshold: Some(streak),
    }
}

fn standard_entries() -> Vec<CatalogEntry> {
    vec![
        // Streak achievements (the only entries the engine unlocks itself)
        streak_entry("streak_7", 7, "7-Day Streak", "Completed a habit 7 days in a row", 50),
        streak_entry("streak_14", 14, "14-Day Streak", "Completed a habit 14 days in a row", 100),
        streak_entry("streak_30", 30, "30-Day Streak", "Completed a habit 30 days in a row", 250),
        streak_entry("streak_100", 100, "100-Day Streak", "Completed a habit 100 days in a row", 500),
        // Habit creation achievements
        entry("first_habit", "Getting Started", "Created your first habit", 10),
        entry("five_habits", "Building Momentum", "Created 5 habits", 50),
        entry("ten_habits", "Habit Master", "Created 10 habits", 100),
        entry("twenty_habits", "Habit Legend", "Created 20 habits", 200),
        // Completion achievements
        entry("first_completion", "First Step", "Completed your first habit", 5),
        entry("ten_completions", "On the Path", "Completed 10 habits total", 25),
        entry("fifty_completions", "Habit Enthusiast", "Completed 50 habits total", 100),
        entry("hundred_completions", "Completion Champion", "Completed 100 habits total", 250),
        entry("five_hundred_completions", "Unstoppable", "Completed 500 habits total", 500),
        // Points achievements
        entry("hundred_points", "Point Collector", "Earned 100 points", 25),
        entry("five_hundred_points", "Point Accumulator", "Earned 500 points", 100),
        entry("thousand_points", "Point Master", "Earned 1000 points", 250),
        entry("five_thousand_points", "Point Legend", "Earned 5000 points", 500),
        // Multi-habit achievements
        entry("simultaneous_streaks_2", "Dual Threat", "Maintain 2 simultaneous 7-day streaks", 75),
        entry("simultaneous_streaks_3", "Triple Threat", "Maintain 3 simultaneous 7-day streaks", 150),
        entry("simultaneous_streaks_5", "Streaking Master", "Maintain 5 simultaneous 7-day streaks", 300),
        // Daily consistency
        entry("daily_7_days", "Week Warrior", "Complete at least one habit every day for 7 days", 75),
        entry("daily_30_days", "Monthly Grind", "Complete at least one habit every day for 30 days", 250),
        // Weekly consistency
        entry("weekly_4_weeks", "Weekly Wonder", "Complete at least 4 habits per week for 4 weeks", 100),
        // Streak milestones (specific habits)
        entry("habit_3_day_streak", "Three-in-a-Row", "Get a 3-day streak on any habit", 15),
        entry("habit_14_day_streak", "Two Week Wonder", "Get a 14-day streak on any habit", 75),
        entry("habit_50_day_streak", "Fifty Days Strong", "Get a 50-day streak on any habit", 300),
        // Time-based achievements
        entry("early_bird", "Early Bird", "Complete a habit before 8 AM", 10),
        entry("night_owl", "Night Owl", "Complete a habit after 10 PM", 10),
        // Behavioral achievements
        entry("comeback", "Comeback Kid", "Restart a habit after breaking a streak", 50),
        entry("variety_5", "Variety is the Spice", "Complete 5 different habits on the same day", 75),
        // Progressive achievements
        entry("level_10", "Level 10", "Reach 10 total achievements", 50),
        entry("level_25", "Level 25", "Reach 25 total achievements", 150),
        entry("level_50", "Master Achiever", "Unlock all 50 achievements", 1000),
        // Seasonal achievements
        entry("spring_2024", "Spring Sprout", "Maintain a 7-day streak during spring", 50),
        entry("summer_2024", "Summer Sizzle", "Maintain a 14-day streak during summer", 100),
        entry("fall_2024", "Fall Focus", "Maintain a 14-day streak during fall", 100),
        entry("winter_2024", "Winter Warrior", "Maintain a 14-day streak during winter", 100),
        // Legacy/special
        entry("perfect_week", "Perfect Week", "Complete all habit goals for 7 consecutive days", 200),
        entry("consistency_100", "Consistency is Key", "Complete at least 100 habits in a single month", 250),
        entry("diversity_expert", "Diversity Expert", "Create habits in 10+ different categories", 150),
        entry("midnight_achiever", "Midnight Achiever", "Earn an achievement between midnight and 1 AM", 25),
        // Milestone achievements
        entry("one_year_member", "One Year Member", "Use the app for one year", 500),
    ]
}
