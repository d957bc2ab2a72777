use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Workshop,
    Hackathon,
    Meetup,
    Conference,
    Sprint,
}

/// An event row as stored by the hosted database. Read-only to this crate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    pub date: NaiveDate, // ISO-8601, e.g. 2024-06-01
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub max_attendees: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub event_type: EventType,
    #[serde(default)]
    pub prizes: Option<Vec<String>>,
    pub is_upcoming: bool,
    #[serde(default)]
    pub is_community_event: bool,
    #[serde(default)]
    pub registration_link: Option<String>,
}

/// An event with its RSVP count attached. The count is computed on every
/// fetch and never written back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub attendees: u64,
}

impl EnrichedEvent {
    pub fn new(event: Event, attendees: u64) -> Self {
        Self { event, attendees }
    }

    pub fn id(&self) -> &str {
        &self.event.id
    }

    pub fn is_upcoming(&self) -> bool {
        self.event.is_upcoming
    }

    /// Share of capacity taken, clamped to `0.0..=1.0`.
    pub fn fill_ratio(&self) -> f64 {
        if self.event.max_attendees == 0 {
            return 0.0;
        }
        (self.attendees as f64 / f64::from(self.event.max_attendees)).clamp(0.0, 1.0)
    }

    pub fn spots_left(&self) -> u64 {
        u64::from(self.event.max_attendees).saturating_sub(self.attendees)
    }

    pub fn is_full(&self) -> bool {
        self.event.max_attendees > 0 && self.attendees >= u64::from(self.event.max_attendees)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn sample_event(id: &str, date: &str, is_upcoming: bool) -> Event {
    Event {
        id: id.to_string(),
        name: format!("Event {id}"),
        description: "Short blurb".to_string(),
        long_description: "A longer description of the event".to_string(),
        date: date.parse().expect("valid sample date"),
        time: "6:00 PM".to_string(),
        location: "Community Hall".to_string(),
        max_attendees: 20,
        tags: vec!["rust".to_string(), "async".to_string()],
        difficulty: Difficulty::Beginner,
        event_type: EventType::Meetup,
        prizes: None,
        is_upcoming,
        is_community_event: true,
        registration_link: None,
    }
}
