use crate::schema::feeds;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = feeds)]
pub struct Feed {
    pub id: Uuid,
    pub url: String,

    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,

    pub content_hash: Option<String>,
    pub should_retry: bool,
    pub raw: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Feed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into().trim().to_string(),
            title: None,
            link: None,
            description: None,
            published_at: None,
            content_hash: None,
            should_retry: true,
            raw: None,
            created_at: crate::db::current_time(),
            updated_at: None,
        }
    }
}
