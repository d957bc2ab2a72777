use serde::Serialize;

use crate::aggregate::{aggregate, FetchError};
use crate::models::EnrichedEvent;
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub upcoming_events: usize,
    pub total_attendees: u64,
    pub events_hosted: usize,
}

/// Events split into the upcoming and past sections. Built fresh on each
/// load and replaced wholesale on refetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventBoard {
    pub upcoming: Vec<EnrichedEvent>,
    pub past: Vec<EnrichedEvent>,
}

impl EventBoard {
    pub async fn load<S>(source: &S) -> Result<Self, FetchError>
    where
        S: EventSource + ?Sized,
    {
        aggregate(source).await.map(Self::from_events)
    }

    pub fn from_events(events: Vec<EnrichedEvent>) -> Self {
        let (upcoming, past) = events.into_iter().partition(EnrichedEvent::is_upcoming);
        Self { upcoming, past }
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            upcoming_events: self.upcoming.len(),
            total_attendees: self.iter().map(|event| event.attendees).sum(),
            events_hosted: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichedEvent> {
        self.upcoming.iter().chain(self.past.iter())
    }
}

/// Borrowed form of [`EventBoard::from_events`]: `(upcoming, past)`.
pub fn partition(events: &[EnrichedEvent]) -> (Vec<&EnrichedEvent>, Vec<&EnrichedEvent>) {
    events.iter().partition(|event| event.is_upcoming())
}
