use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankChange {
    Up,
    Down,
    Same,
    New,
}

/// How a player's rank moved between two consecutive snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub change: RankChange,
    pub rank_difference: i32,
    pub previous_rank: Option<i32>,
}

pub fn classify(current_rank: i32, previous_rank: Option<i32>) -> Movement {
    let Some(previous) = previous_rank else {
        return Movement {
            change: RankChange::New,
            rank_difference: 0,
            previous_rank: None,
        };
    };

    // A smaller rank number is a better placing
    let change = match current_rank.cmp(&previous) {
        std::cmp::Ordering::Less => RankChange::Up,
        std::cmp::Ordering::Greater => RankChange::Down,
        std::cmp::Ordering::Equal => RankChange::Same,
    };

    Movement {
        change,
        rank_difference: (previous - current_rank).abs(),
        previous_rank: Some(previous),
    }
}
