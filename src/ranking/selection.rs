use super::types::EventTotal;
use crate::config::RankingSettings;

/// Picks the events that count toward a total from per-event totals already
/// sorted by points descending.
///
/// At most `max_counted_events` are taken, and discounted-tier events fill at
/// most `max_discounted_events` of those slots. Once the discounted quota is
/// used up, further discounted events are skipped while other tiers still
/// compete for the remaining slots.
pub fn select_best_events(sorted: &[EventTotal], settings: &RankingSettings) -> Vec<EventTotal> {
    let mut selected = Vec::with_capacity(settings.max_counted_events);
    let mut discounted = 0;

    for event in sorted {
        if selected.len() >= settings.max_counted_events {
            break;
        }
        if event.event_type.is_discounted() {
            if discounted >= settings.max_discounted_events {
                continue;
            }
            discounted += 1;
        }
        selected.push(*event);
    }

    selected
}
