use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::Identified;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    pub title: String,
    /// Calendar date as entered, `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl EventItem {
    /// Build the admin console's placeholder event under the given id.
    pub fn placeholder(id: String) -> Self {
        Self {
            id,
            title: "Nouvel Événement".to_string(),
            date: "2024-01-01".to_string(),
            description: "...".to_string(),
            location: "...".to_string(),
            image: None,
        }
    }

    pub fn formatted_date(&self) -> String {
        match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(date) => date.format("%d/%m/%Y").to_string(),
            // Keep whatever the editor typed
            Err(_) => self.date.clone(),
        }
    }
}

impl Identified for EventItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields supplied when creating an event. The id is assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub description: String,
    pub location: String,
    pub image: Option<String>,
}

impl EventDraft {
    pub fn into_event(self, id: String) -> EventItem {
        EventItem {
            id,
            title: self.title,
            date: self.date,
            description: self.description,
            location: self.location,
            image: self.image,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image: Option<Option<String>>,
}

impl EventPatch {
    pub fn apply(&self, event: &EventItem) -> EventItem {
        EventItem {
            id: event.id.clone(),
            title: self.title.clone().unwrap_or_else(|| event.title.clone()),
            date: self.date.clone().unwrap_or_else(|| event.date.clone()),
            description: self.description.clone().unwrap_or_else(|| event.description.clone()),
            location: self.location.clone().unwrap_or_else(|| event.location.clone()),
            image: self.image.clone().unwrap_or_else(|| event.image.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_date() {
        let event = EventItem::placeholder("1".into());
        assert_eq!(event.formatted_date(), "01/01/2024");

        let odd = EventItem {
            date: "printemps".into(),
            ..EventItem::placeholder("2".into())
        };
        assert_eq!(odd.formatted_date(), "printemps");
    }

    #[test]
    fn test_image_is_optional_on_the_wire() {
        let json = r#"{"id":"7","title":"T","date":"2025-01-01","description":"d","location":"l"}"#;
        let event: EventItem = serde_json::from_str(json).unwrap();
        assert_eq!(event.image, None);
        assert!(!serde_json::to_string(&event).unwrap().contains("image"));
    }

    #[test]
    fn test_patch_keeps_id_and_untouched_fields() {
        let event = EventItem::placeholder("42".into());
        let patch = EventPatch {
            title: Some("Congrès".into()),
            ..Default::default()
        };
        let updated = patch.apply(&event);
        assert_eq!(updated.id, "42");
        assert_eq!(updated.title, "Congrès");
        assert_eq!(updated.date, event.date);
    }
}
