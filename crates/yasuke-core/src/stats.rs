//! Profile statistics and the weekly activity chart.
//!
//! Calendar windows ("this week", "this month") are taken at a fixed UTC
//! offset. Weeks start on Sunday.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::growth::{Goal, GoalStatus, Path};
use crate::journal::{average_mood, JournalEntry};
use crate::leveling::{LevelProgress, XpSource, XpTransaction};
use crate::storage::{Config, Database, XpHistoryFilter};
use crate::streak::StreakCalculator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathStats {
    pub total: usize,
    /// Started but not finished.
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JournalStats {
    pub total_entries: usize,
    pub this_month: usize,
    pub average_mood: f64,
    pub longest_streak: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XpStats {
    pub total: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub from_goals: i64,
    pub from_journal: i64,
    pub from_quests: i64,
    pub from_activities: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub paths: PathStats,
    pub goals: GoalStats,
    pub journal: JournalStats,
    pub xp: XpStats,
    pub level: LevelProgress,
}

/// One day of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub xp: i64,
    /// Number of ledger rows that day.
    pub activities: usize,
}

/// Sunday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn local_date(at: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    at.with_timezone(offset).date_naive()
}

/// Start of `date` at `offset`, as a UTC instant.
fn day_start(date: NaiveDate, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

struct Windows {
    week_start: Option<DateTime<Utc>>,
    month_start: Option<DateTime<Utc>>,
}

impl Windows {
    fn new(now: DateTime<Utc>, offset: &FixedOffset) -> Self {
        let today = local_date(now, offset);
        Self {
            week_start: day_start(week_start(today), offset),
            month_start: today.with_day(1).and_then(|d| day_start(d, offset)),
        }
    }
}

fn since(at: DateTime<Utc>, start: Option<DateTime<Utc>>) -> bool {
    start.is_some_and(|start| at >= start)
}

pub fn path_stats(paths: &[Path]) -> PathStats {
    PathStats {
        total: paths.len(),
        active: paths
            .iter()
            .filter(|p| p.progress > 0 && p.progress < 100)
            .count(),
        completed: paths.iter().filter(|p| p.progress >= 100).count(),
    }
}

pub fn goal_stats(goals: &[Goal]) -> GoalStats {
    let with_status = |status: GoalStatus| goals.iter().filter(|g| g.status == status).count();
    GoalStats {
        total: goals.len(),
        completed: goals.iter().filter(|g| g.completed).count(),
        in_progress: with_status(GoalStatus::InProgress),
        pending: with_status(GoalStatus::Pending),
    }
}

pub fn journal_stats(
    entries: &[JournalEntry],
    calculator: &StreakCalculator,
    offset: &FixedOffset,
    now: DateTime<Utc>,
) -> JournalStats {
    let windows = Windows::new(now, offset);
    let timestamps: Vec<DateTime<Utc>> = entries.iter().map(|e| e.created_at).collect();
    JournalStats {
        total_entries: entries.len(),
        this_month: entries
            .iter()
            .filter(|e| since(e.created_at, windows.month_start))
            .count(),
        average_mood: average_mood(entries),
        longest_streak: calculator.longest(&timestamps),
        current_streak: calculator.compute(&timestamps, now).current,
    }
}

fn total<'a>(transactions: impl Iterator<Item = &'a XpTransaction>) -> i64 {
    transactions.map(|t| t.amount).sum()
}

pub fn xp_stats(transactions: &[XpTransaction], offset: &FixedOffset, now: DateTime<Utc>) -> XpStats {
    let windows = Windows::new(now, offset);
    let from = |source: XpSource| total(transactions.iter().filter(|t| t.source == source));

    XpStats {
        total: total(transactions.iter()),
        this_week: total(
            transactions
                .iter()
                .filter(|t| since(t.created_at, windows.week_start)),
        ),
        this_month: total(
            transactions
                .iter()
                .filter(|t| since(t.created_at, windows.month_start)),
        ),
        from_goals: from(XpSource::Goal),
        from_journal: from(XpSource::Journal),
        from_quests: from(XpSource::Quest),
        from_activities: from(XpSource::Activity),
    }
}

/// XP and ledger row count for each day, Sunday to Saturday, of the week
/// containing `now`.
pub fn weekly_activity(
    transactions: &[XpTransaction],
    offset: &FixedOffset,
    now: DateTime<Utc>,
) -> Vec<DayActivity> {
    let start = week_start(local_date(now, offset));
    start
        .iter_days()
        .take(7)
        .map(|date| {
            let (xp, activities) = transactions
                .iter()
                .filter(|t| local_date(t.created_at, offset) == date)
                .fold((0, 0), |(xp, n), t| (xp + t.amount, n + 1));
            DayActivity {
                date,
                xp,
                activities,
            }
        })
        .collect()
}

fn offset_for(config: &Config) -> Result<FixedOffset> {
    Ok(config.streak_calculator()?.offset())
}

impl Database {
    /// Everything the profile page shows, computed at `now`.
    pub fn profile_stats(&self, user_id: &str, config: &Config, now: DateTime<Utc>) -> Result<ProfileStats> {
        let profile = self.require_profile(user_id)?;
        let calculator = config.streak_calculator()?;
        let offset = offset_for(config)?;

        let paths = self.list_paths(user_id)?;
        let goals = self.list_user_goals(user_id)?;
        let entries = self.list_journal_entries(user_id, None)?;
        let transactions = self.xp_history(user_id, &XpHistoryFilter::default())?;

        Ok(ProfileStats {
            paths: path_stats(&paths),
            goals: goal_stats(&goals),
            journal: journal_stats(&entries, &calculator, &offset, now),
            xp: xp_stats(&transactions, &offset, now),
            level: profile.level_progress(),
        })
    }

    pub fn weekly_activity(&self, user_id: &str, config: &Config, now: DateTime<Utc>) -> Result<Vec<DayActivity>> {
        self.require_profile(user_id)?;
        let offset = offset_for(config)?;
        let start = week_start(local_date(now, &offset));
        let filter = XpHistoryFilter {
            since: day_start(start, &offset),
            ..Default::default()
        };
        let transactions = self.xp_history(user_id, &filter)?;
        Ok(weekly_activity(&transactions, &offset, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    fn ts(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    fn tx(amount: i64, source: XpSource, at: &str) -> XpTransaction {
        XpTransaction {
            id: format!("t-{at}"),
            user_id: "u1".to_string(),
            amount,
            source,
            source_id: "s".to_string(),
            description: None,
            created_at: ts(at),
        }
    }

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    // 2026-10-19 is a Monday.
    const NOW: &str = "2026-10-19T12:00:00Z";

    #[test]
    fn week_starts_on_sunday() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(week_start(monday), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn xp_windows_and_sources() {
        let txs = vec![
            tx(50, XpSource::Goal, "2026-10-19T08:00:00Z"),
            tx(30, XpSource::Journal, "2026-10-18T00:00:00Z"),
            tx(25, XpSource::Activity, "2026-10-17T23:59:59Z"),
            tx(40, XpSource::Quest, "2026-09-30T10:00:00Z"),
        ];
        let stats = xp_stats(&txs, &utc(), ts(NOW));
        assert_eq!(stats.total, 145);
        assert_eq!(stats.this_week, 80);
        assert_eq!(stats.this_month, 105);
        assert_eq!(stats.from_goals, 50);
        assert_eq!(stats.from_journal, 30);
        assert_eq!(stats.from_quests, 40);
        assert_eq!(stats.from_activities, 25);
    }

    #[test]
    fn weekly_activity_covers_seven_days() {
        let txs = vec![
            tx(50, XpSource::Goal, "2026-10-19T08:00:00Z"),
            tx(30, XpSource::Journal, "2026-10-19T09:00:00Z"),
            tx(25, XpSource::Activity, "2026-10-18T01:00:00Z"),
            tx(99, XpSource::Quest, "2026-10-17T10:00:00Z"),
        ];
        let days = weekly_activity(&txs, &utc(), ts(NOW));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!((days[0].xp, days[0].activities), (25, 1));
        assert_eq!((days[1].xp, days[1].activities), (80, 2));
        assert!(days[2..].iter().all(|d| d.xp == 0 && d.activities == 0));
    }

    #[test]
    fn offset_moves_day_boundaries() {
        // 01:00Z on Sunday is still Saturday evening at UTC-5.
        let txs = vec![tx(25, XpSource::Activity, "2026-10-18T01:00:00Z")];
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let days = weekly_activity(&txs, &offset, ts(NOW));
        assert!(days.iter().all(|d| d.xp == 0));
    }

    #[test]
    fn path_and_goal_counts() {
        let mut a = Path::new("u1", "a");
        a.progress = 40;
        let mut b = Path::new("u1", "b");
        b.progress = 100;
        let c = Path::new("u1", "c");
        assert_eq!(
            path_stats(&[a, b, c]),
            PathStats {
                total: 3,
                active: 1,
                completed: 1
            }
        );

        let mut done = Goal::new("p", "done");
        done.status = GoalStatus::Completed;
        done.completed = true;
        let mut doing = Goal::new("p", "doing");
        doing.status = GoalStatus::InProgress;
        let todo = Goal::new("p", "todo");
        let stats = goal_stats(&[done, doing, todo]);
        assert_eq!((stats.total, stats.completed, stats.in_progress, stats.pending), (3, 1, 1, 1));
    }

    #[test]
    fn journal_counts_month_and_streak() {
        let mut entries = Vec::new();
        for (at, mood) in [
            ("2026-10-19T07:00:00Z", Some(5)),
            ("2026-10-18T07:00:00Z", Some(3)),
            ("2026-09-20T07:00:00Z", None),
        ] {
            let mut entry = JournalEntry::new("u1", "x");
            entry.created_at = ts(at);
            entry.mood = mood;
            entries.push(entry);
        }
        let stats = journal_stats(&entries, &StreakCalculator::default(), &utc(), ts(NOW));
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.this_month, 2);
        assert_eq!(stats.average_mood, 4.0);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn best_journal_streak_survives_a_lapse() {
        let mut entries = Vec::new();
        for at in ["2026-10-01T07:00:00Z", "2026-10-02T07:00:00Z", "2026-10-03T07:00:00Z"] {
            let mut entry = JournalEntry::new("u1", "x");
            entry.created_at = ts(at);
            entries.push(entry);
        }
        let stats = journal_stats(&entries, &StreakCalculator::default(), &utc(), ts(NOW));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn profile_stats_skip_malformed_journal_rows() {
        let db = Database::open_memory().unwrap();
        db.create_profile(&crate::profile::Profile::new("u1", "a@b.c", "A"))
            .unwrap();
        let mut entry = JournalEntry::new("u1", "steady");
        entry.created_at = ts("2026-10-19T07:00:00Z");
        entry.mood = Some(4);
        db.create_journal_entry(&entry).unwrap();
        db.conn()
            .execute(
                "INSERT INTO journal_entries (id, user_id, content, created_at, updated_at)
                 VALUES ('bad', 'u1', 'broken', 'yesterday-ish', 'yesterday-ish')",
                [],
            )
            .unwrap();

        let stats = db.profile_stats("u1", &Config::default(), ts(NOW)).unwrap();
        assert_eq!(stats.journal.total_entries, 1);
        assert_eq!(stats.journal.current_streak, 1);
        assert_eq!(stats.journal.average_mood, 4.0);
    }
}
