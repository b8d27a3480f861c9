use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{seed, EventItem, Language, Member, NewsItem};
use crate::storage::{KeyValueStore, StorageError};

use super::ops::check_ids;

pub const LANGUAGE_SLOT: &str = "arm_lang";
pub const BULLETIN_SLOT: &str = "arm_bulletin";
pub const MEMBERS_SLOT: &str = "arm_members";
pub const EVENTS_SLOT: &str = "arm_events";
pub const NEWS_SLOT: &str = "arm_news";

/// Schema version written into list slots.
pub const LIST_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct ListEnvelope<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct StoredList<T> {
    version: u32,
    items: Vec<T>,
}

/// List slots written before versioning hold a bare JSON array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredListFormat<T> {
    Versioned(StoredList<T>),
    Legacy(Vec<T>),
}

/// All five entities as hydrated at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Entities {
    pub language: Language,
    pub bulletin: String,
    pub members: Vec<Member>,
    pub events: Vec<EventItem>,
    pub news: Vec<NewsItem>,
}

impl Default for Entities {
    fn default() -> Self {
        Self {
            language: seed::default_language(),
            bulletin: seed::default_bulletin(),
            members: seed::leadership(),
            events: seed::initial_events(),
            news: seed::initial_news(),
        }
    }
}

/// How a slot's content was obtained at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOrigin {
    /// Nothing stored; the default was used.
    Absent,
    /// Stored in the current format.
    Stored,
    /// Stored as a bare array from before list versioning.
    Legacy,
    /// Something is stored but could not be used; the default was used and
    /// the stored content is left as it is.
    Rejected,
}

/// Hydrated entities plus the slots whose stored content was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydration {
    pub entities: Entities,
    pub rejected: Vec<&'static str>,
}

enum SlotRead {
    Absent,
    Unreadable,
    Present(String),
}

/// Reads and writes each persisted entity in its own durable slot.
///
/// Loading never fails: an absent slot, an unreadable slot or a slot that
/// does not validate all yield the compiled-in default.
pub struct EntityStore<S: KeyValueStore> {
    slots: S,
}

impl<S: KeyValueStore> EntityStore<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn load_all(&self) -> Entities {
        self.hydrate().entities
    }

    /// Load every entity and report which slots fell back to the default
    /// because their stored content was unusable.
    pub fn hydrate(&self) -> Hydration {
        let (language, language_origin) = self.language_with_origin();
        let (bulletin, bulletin_origin) = self.bulletin_with_origin();
        let (members, members_origin) = self.load_list(MEMBERS_SLOT, seed::leadership, |_| Ok(()));
        let (events, events_origin) = self.load_list(EVENTS_SLOT, seed::initial_events, check_ids);
        let (news, news_origin) = self.load_list(NEWS_SLOT, seed::initial_news, check_ids);

        let rejected = [
            (LANGUAGE_SLOT, language_origin),
            (BULLETIN_SLOT, bulletin_origin),
            (MEMBERS_SLOT, members_origin),
            (EVENTS_SLOT, events_origin),
            (NEWS_SLOT, news_origin),
        ]
        .into_iter()
        .filter(|(_, origin)| *origin == SlotOrigin::Rejected)
        .map(|(key, _)| key)
        .collect();

        Hydration {
            entities: Entities {
                language,
                bulletin,
                members,
                events,
                news,
            },
            rejected,
        }
    }

    fn read(&self, key: &str) -> SlotRead {
        match self.slots.get(key) {
            Ok(Some(raw)) => SlotRead::Present(raw),
            Ok(None) => {
                debug!(slot = key, "Slot absent, using default");
                SlotRead::Absent
            }
            Err(e) => {
                warn!(slot = key, error = %e, "Slot unreadable, using default");
                SlotRead::Unreadable
            }
        }
    }

    fn load_list<T, V>(&self, key: &str, default: fn() -> Vec<T>, validate: V) -> (Vec<T>, SlotOrigin)
    where
        T: DeserializeOwned,
        V: Fn(&[T]) -> Result<(), String>,
    {
        let raw = match self.read(key) {
            SlotRead::Present(raw) => raw,
            SlotRead::Absent => return (default(), SlotOrigin::Absent),
            SlotRead::Unreadable => return (default(), SlotOrigin::Rejected),
        };

        let (items, origin) = match serde_json::from_str::<StoredListFormat<T>>(&raw) {
            Ok(StoredListFormat::Versioned(list)) if list.version == LIST_SCHEMA_VERSION => {
                (list.items, SlotOrigin::Stored)
            }
            Ok(StoredListFormat::Versioned(list)) => {
                warn!(slot = key, version = list.version, "Unsupported list schema version, using default");
                return (default(), SlotOrigin::Rejected);
            }
            Ok(StoredListFormat::Legacy(items)) => {
                debug!(slot = key, count = items.len(), "Loaded legacy list slot");
                (items, SlotOrigin::Legacy)
            }
            Err(e) => {
                warn!(slot = key, error = %e, "Malformed list slot, using default");
                return (default(), SlotOrigin::Rejected);
            }
        };

        if let Err(reason) = validate(&items) {
            warn!(slot = key, reason = %reason, "List slot failed validation, using default");
            return (default(), SlotOrigin::Rejected);
        }
        (items, origin)
    }

    fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let envelope = ListEnvelope {
            version: LIST_SCHEMA_VERSION,
            items,
        };
        let contents = serde_json::to_string(&envelope)?;
        self.slots.set(key, &contents)
    }

    // ===== Language =====

    pub fn load_language(&self) -> Language {
        self.language_with_origin().0
    }

    fn language_with_origin(&self) -> (Language, SlotOrigin) {
        match self.read(LANGUAGE_SLOT) {
            SlotRead::Present(code) => match Language::from_code(&code) {
                Some(language) => (language, SlotOrigin::Stored),
                None => {
                    warn!(slot = LANGUAGE_SLOT, code = %code, "Unknown language code, using default");
                    (seed::default_language(), SlotOrigin::Rejected)
                }
            },
            SlotRead::Absent => (seed::default_language(), SlotOrigin::Absent),
            SlotRead::Unreadable => (seed::default_language(), SlotOrigin::Rejected),
        }
    }

    pub fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.slots.set(LANGUAGE_SLOT, language.code())
    }

    // ===== Bulletin =====

    /// An empty stored bulletin is treated like an absent one.
    pub fn load_bulletin(&self) -> String {
        self.bulletin_with_origin().0
    }

    fn bulletin_with_origin(&self) -> (String, SlotOrigin) {
        match self.read(BULLETIN_SLOT) {
            SlotRead::Present(text) if !text.is_empty() => (text, SlotOrigin::Stored),
            SlotRead::Present(_) | SlotRead::Absent => (seed::default_bulletin(), SlotOrigin::Absent),
            SlotRead::Unreadable => (seed::default_bulletin(), SlotOrigin::Rejected),
        }
    }

    pub fn save_bulletin(&self, bulletin: &str) -> Result<(), StorageError> {
        self.slots.set(BULLETIN_SLOT, bulletin)
    }

    // ===== Members =====

    pub fn load_members(&self) -> Vec<Member> {
        self.load_list(MEMBERS_SLOT, seed::leadership, |_| Ok(())).0
    }

    pub fn save_members(&self, members: &[Member]) -> Result<(), StorageError> {
        self.save_list(MEMBERS_SLOT, members)
    }

    // ===== Events =====

    pub fn load_events(&self) -> Vec<EventItem> {
        self.load_list(EVENTS_SLOT, seed::initial_events, check_ids).0
    }

    pub fn save_events(&self, events: &[EventItem]) -> Result<(), StorageError> {
        self.save_list(EVENTS_SLOT, events)
    }

    // ===== News =====

    pub fn load_news(&self) -> Vec<NewsItem> {
        self.load_list(NEWS_SLOT, seed::initial_news, check_ids).0
    }

    pub fn save_news(&self, news: &[NewsItem]) -> Result<(), StorageError> {
        self.save_list(NEWS_SLOT, news)
    }
}

// ============================================================================
// Tests
// ============================================================================
