//! Profile statistics derived from the journal.

use serde::Serialize;

use crate::record::MatchRecord;

/// Career totals shown on the profile screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfileStats {
    pub total_matches: usize,
    pub total_goals: u64,
    pub total_assists: u64,
}

impl ProfileStats {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        records.iter().fold(Self::default(), |acc, r| Self {
            total_matches: acc.total_matches + 1,
            total_goals: acc.total_goals + u64::from(r.goals),
            total_assists: acc.total_assists + u64::from(r.assists),
        })
    }

    /// Goals plus assists.
    pub fn goal_contributions(&self) -> u64 {
        self.total_goals + self.total_assists
    }

    pub fn goals_per_match(&self) -> f64 {
        per_match(self.total_goals, self.total_matches)
    }

    pub fn assists_per_match(&self) -> f64 {
        per_match(self.total_assists, self.total_matches)
    }
}

fn per_match(total: u64, matches: usize) -> f64 {
    if matches == 0 {
        0.0
    } else {
        total as f64 / matches as f64
    }
}
