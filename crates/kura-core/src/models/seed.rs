//! Compiled-in defaults used whenever a durable slot is empty or unreadable,
//! plus the party's fixed identity constants.

use super::{EventItem, Language, Member, NewsItem};

pub const PARTY_NAME: &str = "Alliance Pour le Rassemblement Malien";
pub const PARTY_ACRONYM: &str = "A.R.M";
pub const PARTY_MOTTO: &str = "Fraternité – Liberté – Égalité";
pub const PARTY_HQ: &str = "Sebenikoro, Bamako – Rue 530, Porte 245, Mali";
pub const PARTY_PHONE: &str = "+34 632 60 71 01";
pub const PARTY_EMAILS: [&str; 2] = ["bouadiakite@gmail.com", "info.armmali@gmail.com"];

pub const DEFAULT_BULLETIN: &str = "Bienvenue sur la plateforme officielle de l'ARM. Ensemble pour un Mali fort et souverain. Consultez nos objectifs officiels dans l'onglet Programme.";

pub const MALI_REGIONS: [&str; 11] = [
    "Bamako",
    "Kayes",
    "Koulikoro",
    "Sikasso",
    "Ségou",
    "Mopti",
    "Tombouctou",
    "Gao",
    "Kidal",
    "Ménaka",
    "Taoudénit",
];

pub fn default_language() -> Language {
    Language::Fr
}

pub fn default_bulletin() -> String {
    DEFAULT_BULLETIN.to_string()
}

pub fn leadership() -> Vec<Member> {
    vec![
        Member::new("Lassine Diakité", "Président (Entrepreneur)", "Bamako / Espagne"),
        Member::new("Karifa Keita", "Secrétaire Général (Entrepreneur)", "Bamako"),
        Member::new("Modibo Keita", "Secrétaire Administratif (Gestionnaire)", "Bamako"),
    ]
}

pub fn initial_events() -> Vec<EventItem> {
    vec![EventItem {
        id: "1".to_string(),
        title: "Adoption des Statuts".to_string(),
        date: "2025-04-05".to_string(),
        description: "Réunion officielle de fondation du parti à Bamako.".to_string(),
        location: "Sebenikoro".to_string(),
        image: None,
    }]
}

pub fn initial_news() -> Vec<NewsItem> {
    vec![NewsItem {
        id: "1".to_string(),
        title: "Mali Kura : Vers un nouveau départ".to_string(),
        date: "2025-04-06".to_string(),
        summary: "L'ARM s'engage pour la refondation des institutions.".to_string(),
        content: "...".to_string(),
    }]
}
