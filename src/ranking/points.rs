use std::collections::HashMap;

use log::debug;

use crate::domain::{Category, EventType, Position};

type RuleKey = (EventType, Category, Position);

/// Upper bound accepted for a single priced or manual result
pub const MAX_POINTS: i32 = 100_000;

/// In-memory copy of the point rule table
#[derive(Debug, Clone, Default)]
pub struct PointTable {
    rules: HashMap<RuleKey, i32>,
}

impl PointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event_type: EventType, category: Category, position: Position, points: i32) {
        self.rules.insert((event_type, category, position), points);
    }

    pub fn lookup(&self, event_type: EventType, category: Category, position: Position) -> Option<i32> {
        self.rules.get(&(event_type, category, position)).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(EventType, Category, Position, i32)> for PointTable {
    fn from_iter<I: IntoIterator<Item = (EventType, Category, Position, i32)>>(iter: I) -> Self {
        let mut table = PointTable::new();
        for (event_type, category, position, points) in iter {
            table.insert(event_type, category, position, points);
        }
        table
    }
}

/// Category whose rules price a result when its own category has none.
/// Mixed doubles are paid like doubles unless a dedicated rule exists.
pub fn fallback_category(category: Category) -> Option<Category> {
    match category {
        Category::Mixed => Some(Category::Doubles),
        _ => None,
    }
}

/// Points awarded for a finish. A manual value always wins, team results
/// are never priced from the table, and a missing rule is worth 0.
pub fn resolve_points(
    table: &PointTable,
    event_type: EventType,
    category: Category,
    position: Position,
    manual: Option<i32>,
) -> i32 {
    if let Some(points) = manual {
        return points;
    }
    if category.requires_manual_points() {
        return 0;
    }

    let found = table.lookup(event_type, category, position).or_else(|| {
        fallback_category(category).and_then(|fallback| table.lookup(event_type, fallback, position))
    });

    match found {
        Some(points) => points,
        None => {
            debug!("No point rule for {event_type} / {category} / {position}, awarding 0");
            0
        }
    }
}
