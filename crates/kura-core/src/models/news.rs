use serde::{Deserialize, Serialize};

use crate::store::Identified;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    pub content: String,
}

impl Identified for NewsItem {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsDraft {
    pub title: String,
    pub date: String,
    pub summary: String,
    pub content: String,
}

impl NewsDraft {
    pub fn into_news(self, id: String) -> NewsItem {
        NewsItem {
            id,
            title: self.title,
            date: self.date,
            summary: self.summary,
            content: self.content,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
}

impl NewsPatch {
    pub fn apply(&self, item: &NewsItem) -> NewsItem {
        NewsItem {
            id: item.id.clone(),
            title: self.title.clone().unwrap_or_else(|| item.title.clone()),
            date: self.date.clone().unwrap_or_else(|| item.date.clone()),
            summary: self.summary.clone().unwrap_or_else(|| item.summary.clone()),
            content: self.content.clone().unwrap_or_else(|| item.content.clone()),
        }
    }
}
