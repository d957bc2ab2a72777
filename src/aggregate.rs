use futures::future::join_all;
use log::{debug, error, warn};
use thiserror::Error;

use crate::models::EnrichedEvent;
use crate::source::{EventSource, QueryError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to list events: {0}")]
    List(#[source] QueryError),
}

impl FetchError {
    pub fn stage(&self) -> &'static str {
        match self {
            FetchError::List(_) => "list",
        }
    }
}

/// Lists every event and attaches its RSVP count.
///
/// The count queries run concurrently and are joined before returning. A
/// failed count leaves that event at zero attendees instead of failing the
/// batch; only a failed listing is an error. Output order matches the order
/// returned by [`EventSource::list_events`].
pub async fn aggregate<S>(source: &S) -> Result<Vec<EnrichedEvent>, FetchError>
where
    S: EventSource + ?Sized,
{
    let events = source.list_events().await.map_err(|err| {
        error!("error fetching events: {err}");
        FetchError::List(err)
    })?;

    let counts = join_all(events.iter().map(|event| source.count_rsvps(&event.id))).await;

    let enriched = events
        .into_iter()
        .zip(counts)
        .map(|(event, count)| {
            let attendees = count.unwrap_or_else(|err| {
                warn!("rsvp count failed for event {}: {err}", event.id);
                0
            });
            EnrichedEvent::new(event, attendees)
        })
        .collect::<Vec<_>>();

    debug!("aggregated {} events", enriched.len());
    Ok(enriched)
}
