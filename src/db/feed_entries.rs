use crate::models::feed_entry::FeedEntry;
use crate::schema::feed_entries;
use crate::sync::reconcile::{EntryFields, EntryMutation};
use chrono::{DateTime, Utc};
use diesel::result::Error;
use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

#[derive(Insertable)]
#[diesel(table_name = feed_entries)]
pub struct NewFeedEntry {
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

impl From<FeedEntry> for NewFeedEntry {
    fn from(entry: FeedEntry) -> Self {
        Self {
            id: entry.id,
            feed_id: entry.feed_id,
            guid: entry.guid,
            title: entry.title,
            link: entry.link,
            description: entry.description,
            published_at: entry.published_at,
            content_hash: entry.content_hash,
            raw: entry.raw,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = feed_entries)]
struct EntryChangeset {
    guid: Option<String>,
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    content_hash: Option<String>,
    raw: Option<serde_json::Value>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<&EntryFields> for EntryChangeset {
    fn from(fields: &EntryFields) -> Self {
        Self {
            guid: fields.guid.clone(),
            title: Some(fields.title.clone()),
            link: Some(fields.link.clone()),
            description: Some(fields.description.clone()),
            published_at: fields.published_at,
            content_hash: Some(fields.content_hash.clone()),
            raw: Some(fields.raw.clone()),
            updated_at: Some(fields.updated_at),
        }
    }
}

pub fn find_by_guids(
    conn: &mut PgConnection,
    feed_id: Uuid,
    guids: &[String],
) -> Result<Vec<FeedEntry>, Error> {
    if guids.is_empty() {
        return Ok(vec![]);
    }

    feed_entries::table
        .filter(feed_entries::feed_id.eq(feed_id))
        .filter(feed_entries::guid.eq_any(guids.to_vec()))
        .load::<FeedEntry>(conn)
}

pub fn find(conn: &mut PgConnection, feed_id: Uuid) -> Result<Vec<FeedEntry>, Error> {
    feed_entries::table
        .filter(feed_entries::feed_id.eq(feed_id))
        .order(feed_entries::created_at)
        .load::<FeedEntry>(conn)
}

pub fn apply(conn: &mut PgConnection, mutations: &[EntryMutation]) -> Result<(), Error> {
    let new_entries: Vec<NewFeedEntry> = mutations
        .iter()
        .filter_map(|mutation| mutation.to_new_entry())
        .map(NewFeedEntry::from)
        .collect();

    if !new_entries.is_empty() {
        diesel::insert_into(feed_entries::table)
            .values(&new_entries)
            .execute(conn)?;
    }

    for mutation in mutations {
        if let EntryMutation::Update { id, fields } = mutation {
            diesel::update(feed_entries::table.find(*id))
                .set(EntryChangeset::from(fields))
                .execute(conn)?;
        }
    }

    Ok(())
}
