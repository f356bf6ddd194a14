pub mod aggregation;
pub mod delta;
pub mod points;
pub mod selection;
pub mod types;

pub use aggregation::aggregate;
pub use delta::{Movement, RankChange, classify};
pub use points::{MAX_POINTS, PointTable, resolve_points};
pub use selection::select_best_events;
pub use types::{AggregateFilter, EventTotal, PlayerAggregate, ScoringRow};
