//! Application state management.
//!
//! `AppState` is the single owner of the site's persisted entities. Views
//! read through its accessors and request changes through its mutators; each
//! mutator builds the next value without touching the current one, writes
//! it through to the durable slot, and only then commits it in memory.

use tracing::{debug, info, warn};

use crate::document::{apply_language, Document, DocumentState};
use crate::models::{
    EventDraft, EventItem, EventPatch, Language, Member, MemberPatch, NewsDraft, NewsItem,
    NewsPatch,
};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::ops::{appended, removed_at, removed_by_id, updated_at, updated_by_id};
use crate::store::manager::{BULLETIN_SLOT, EVENTS_SLOT, LANGUAGE_SLOT, MEMBERS_SLOT, NEWS_SLOT};
use crate::store::{EntityStore, IdSource, Identified, TimestampIds};

pub struct AppState<S: KeyValueStore, D: Document = DocumentState, I: IdSource = TimestampIds> {
    store: EntityStore<S>,
    document: D,
    ids: I,
    language: Language,
    bulletin: String,
    members: Vec<Member>,
    events: Vec<EventItem>,
    news: Vec<NewsItem>,
}

impl<S: KeyValueStore, D: Document> AppState<S, D, TimestampIds> {
    /// Hydrate every entity from its slot, with timestamp ids for new entries.
    pub fn hydrate(store: EntityStore<S>, document: D) -> Self {
        Self::hydrate_with_ids(store, document, TimestampIds::new())
    }
}

impl<S: KeyValueStore, D: Document, I: IdSource> AppState<S, D, I> {
    pub fn hydrate_with_ids(store: EntityStore<S>, document: D, ids: I) -> Self {
        let hydration = store.hydrate();
        let entities = hydration.entities;
        let mut state = Self {
            store,
            document,
            ids,
            language: entities.language,
            bulletin: entities.bulletin,
            members: entities.members,
            events: entities.events,
            news: entities.news,
        };
        state.flush_all(&hydration.rejected);
        apply_language(&mut state.document, state.language);
        info!(
            language = %state.language,
            members = state.members.len(),
            events = state.events.len(),
            news = state.news.len(),
            "State hydrated"
        );
        state
    }

    /// Write entities back once after hydration. Seeds become durable and
    /// legacy slots are rewritten in the current schema. Slots listed in
    /// `skip` held unusable content and are left untouched until the next
    /// mutation of that entity.
    fn flush_all(&self, skip: &[&str]) {
        for slot in [LANGUAGE_SLOT, BULLETIN_SLOT, MEMBERS_SLOT, EVENTS_SLOT, NEWS_SLOT] {
            if skip.contains(&slot) {
                debug!(slot, "Keeping rejected slot as stored");
                continue;
            }
            let result = match slot {
                LANGUAGE_SLOT => self.store.save_language(self.language),
                BULLETIN_SLOT => self.store.save_bulletin(&self.bulletin),
                MEMBERS_SLOT => self.store.save_members(&self.members),
                EVENTS_SLOT => self.store.save_events(&self.events),
                _ => self.store.save_news(&self.news),
            };
            if let Err(e) = result {
                warn!(slot, error = %e, "Failed to write entity after hydration");
            }
        }
    }

    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Drop every durable slot and fall back to the seed data, as when the
    /// user clears site data.
    pub fn clear_site_data(&mut self) -> Result<(), StorageError> {
        self.store.slots().clear()?;
        let entities = self.store.load_all();
        self.language = entities.language;
        self.bulletin = entities.bulletin;
        self.members = entities.members;
        self.events = entities.events;
        self.news = entities.news;
        self.flush_all(&[]);
        apply_language(&mut self.document, self.language);
        info!("Site data cleared");
        Ok(())
    }

    // ===== Language =====

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), StorageError> {
        self.store.save_language(language)?;
        self.language = language;
        apply_language(&mut self.document, language);
        debug!(language = %language, direction = %language.direction(), "Language changed");
        Ok(())
    }

    // ===== Bulletin =====

    pub fn bulletin(&self) -> &str {
        &self.bulletin
    }

    pub fn set_bulletin(&mut self, bulletin: impl Into<String>) -> Result<(), StorageError> {
        let bulletin = bulletin.into();
        self.store.save_bulletin(&bulletin)?;
        self.bulletin = bulletin;
        Ok(())
    }

    // ===== Members =====

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    fn commit_members(&mut self, next: Vec<Member>) -> Result<(), StorageError> {
        self.store.save_members(&next)?;
        self.members = next;
        Ok(())
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), StorageError> {
        let next = appended(&self.members, member);
        self.commit_members(next)
    }

    /// Returns whether a member exists at `index`.
    pub fn update_member(&mut self, index: usize, patch: &MemberPatch) -> Result<bool, StorageError> {
        let found = index < self.members.len();
        let next = updated_at(&self.members, index, |m| patch.apply(m));
        self.commit_members(next)?;
        Ok(found)
    }

    pub fn remove_member(&mut self, index: usize) -> Result<bool, StorageError> {
        let found = index < self.members.len();
        let next = removed_at(&self.members, index);
        self.commit_members(next)?;
        Ok(found)
    }

    // ===== Events =====

    pub fn events(&self) -> &[EventItem] {
        &self.events
    }

    fn commit_events(&mut self, next: Vec<EventItem>) -> Result<(), StorageError> {
        self.store.save_events(&next)?;
        self.events = next;
        Ok(())
    }

    /// Append a new event and return the id assigned to it.
    pub fn add_event(&mut self, draft: EventDraft) -> Result<String, StorageError> {
        let id = self.ids.next_id();
        let next = appended(&self.events, draft.into_event(id.clone()));
        self.commit_events(next)?;
        Ok(id)
    }

    pub fn add_placeholder_event(&mut self) -> Result<String, StorageError> {
        let id = self.ids.next_id();
        let next = appended(&self.events, EventItem::placeholder(id.clone()));
        self.commit_events(next)?;
        Ok(id)
    }

    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> Result<bool, StorageError> {
        let found = self.events.iter().any(|e| e.id() == id);
        let next = updated_by_id(&self.events, id, |e| patch.apply(e));
        self.commit_events(next)?;
        Ok(found)
    }

    pub fn remove_event(&mut self, id: &str) -> Result<bool, StorageError> {
        let found = self.events.iter().any(|e| e.id() == id);
        let next = removed_by_id(&self.events, id);
        self.commit_events(next)?;
        Ok(found)
    }

    // ===== News =====

    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    fn commit_news(&mut self, next: Vec<NewsItem>) -> Result<(), StorageError> {
        self.store.save_news(&next)?;
        self.news = next;
        Ok(())
    }

    pub fn add_news(&mut self, draft: NewsDraft) -> Result<String, StorageError> {
        let id = self.ids.next_id();
        let next = appended(&self.news, draft.into_news(id.clone()));
        self.commit_news(next)?;
        Ok(id)
    }

    pub fn update_news(&mut self, id: &str, patch: &NewsPatch) -> Result<bool, StorageError> {
        let found = self.news.iter().any(|n| n.id() == id);
        let next = updated_by_id(&self.news, id, |n| patch.apply(n));
        self.commit_news(next)?;
        Ok(found)
    }

    pub fn remove_news(&mut self, id: &str) -> Result<bool, StorageError> {
        let found = self.news.iter().any(|n| n.id() == id);
        let next = removed_by_id(&self.news, id);
        self.commit_news(next)?;
        Ok(found)
    }
}

// ============================================================================
// Tests
// ============================================================================
