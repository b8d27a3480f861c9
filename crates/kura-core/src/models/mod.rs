//! Data models for the site's persisted entities.
//!
//! - `Language`, `Direction`: interface language and document direction
//! - `Member`: leadership and member listing
//! - `EventItem`, `NewsItem`: admin-managed content lists
//! - `seed`: compiled-in defaults and party constants

pub mod event;
pub mod language;
pub mod member;
pub mod news;
pub mod seed;

pub use event::{EventDraft, EventItem, EventPatch};
pub use language::{Direction, Language};
pub use member::{Member, MemberPatch};
pub use news::{NewsDraft, NewsItem, NewsPatch};
