use crate::schema::feed_entries;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = feed_entries)]
pub struct FeedEntry {
    pub id: Uuid,
    pub feed_id: Uuid,
    pub guid: Option<String>,

    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,

    pub content_hash: Option<String>,
    pub raw: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
