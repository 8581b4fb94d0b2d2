use crate::models::{Feed, FeedEntry};
use crate::sync::reader::{FetchedFeed, FetchedFeedItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use xxhash_rust::xxh64::xxh64;

pub fn content_hash<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_vec(record)?;

    Ok(format!("{:016x}", xxh64(&serialized, 0)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedMutation {
    pub content_hash: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub raw: serde_json::Value,
}

impl FeedMutation {
    pub fn apply_to(&self, feed: &mut Feed) {
        feed.content_hash = Some(self.content_hash.clone());
        feed.title = Some(self.title.clone());
        feed.link = Some(self.link.clone());
        feed.description = Some(self.description.clone());
        feed.updated_at = Some(self.updated_at);
        feed.raw = Some(self.raw.clone());

        if self.published_at.is_some() {
            feed.published_at = self.published_at;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub guid: Option<String>,
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryMutation {
    Create {
        id: Uuid,
        feed_id: Uuid,
        fields: EntryFields,
    },
    Update {
        id: Uuid,
        fields: EntryFields,
    },
}

impl EntryMutation {
    pub fn id(&self) -> Uuid {
        match self {
            EntryMutation::Create { id, .. } => *id,
            EntryMutation::Update { id, .. } => *id,
        }
    }

    pub fn fields(&self) -> &EntryFields {
        match self {
            EntryMutation::Create { fields, .. } => fields,
            EntryMutation::Update { fields, .. } => fields,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, EntryMutation::Create { .. })
    }

    pub fn to_new_entry(&self) -> Option<FeedEntry> {
        match self {
            EntryMutation::Create {
                id,
                feed_id,
                fields,
            } => Some(FeedEntry {
                id: *id,
                feed_id: *feed_id,
                guid: fields.guid.clone(),
                title: Some(fields.title.clone()),
                link: Some(fields.link.clone()),
                description: Some(fields.description.clone()),
                published_at: fields.published_at,
                content_hash: Some(fields.content_hash.clone()),
                raw: Some(fields.raw.clone()),
                created_at: fields.updated_at,
                updated_at: Some(fields.updated_at),
            }),
            EntryMutation::Update { .. } => None,
        }
    }

    pub fn apply_to(&self, entry: &mut FeedEntry) {
        if let EntryMutation::Update { fields, .. } = self {
            entry.guid = fields.guid.clone();
            entry.title = Some(fields.title.clone());
            entry.link = Some(fields.link.clone());
            entry.description = Some(fields.description.clone());
            entry.content_hash = Some(fields.content_hash.clone());
            entry.updated_at = Some(fields.updated_at);
            entry.raw = Some(fields.raw.clone());

            if fields.published_at.is_some() {
                entry.published_at = fields.published_at;
            }
        }
    }
}

pub fn reconcile_feed(
    stored_feed: &Feed,
    fetched_feed: &FetchedFeed,
    now: DateTime<Utc>,
) -> Result<Option<FeedMutation>, serde_json::Error> {
    let metadata = &fetched_feed.metadata;
    let new_hash = content_hash(metadata)?;

    if stored_feed.content_hash.as_deref() == Some(new_hash.as_str()) {
        return Ok(None);
    }

    Ok(Some(FeedMutation {
        content_hash: new_hash,
        title: metadata.title.clone().unwrap_or_default(),
        link: metadata.link.clone().unwrap_or_default(),
        description: metadata.description.clone().unwrap_or_default(),
        published_at: metadata.published_at,
        updated_at: now,
        raw: serde_json::to_value(metadata)?,
    }))
}

/// Matches fetched items to stored entries by guid.
///
/// Items without a guid can never match and are created on every call. A guid
/// repeated within `fetched_items` is only handled at its first occurrence.
pub fn reconcile_entries(
    feed_id: Uuid,
    stored_entries_by_guid: &HashMap<String, FeedEntry>,
    fetched_items: &[FetchedFeedItem],
    now: DateTime<Utc>,
) -> Result<Vec<EntryMutation>, serde_json::Error> {
    let mut mutations = Vec::new();
    let mut seen_guids: HashSet<&str> = HashSet::new();

    for item in fetched_items {
        if let Some(guid) = item.guid.as_deref() {
            if !seen_guids.insert(guid) {
                continue;
            }
        }

        let new_hash = content_hash(item)?;
        let existing_entry = item
            .guid
            .as_ref()
            .and_then(|guid| stored_entries_by_guid.get(guid));

        match existing_entry {
            Some(entry) if entry.content_hash.as_deref() == Some(new_hash.as_str()) => (),
            Some(entry) => mutations.push(EntryMutation::Update {
                id: entry.id,
                fields: entry_fields(item, new_hash, now)?,
            }),
            None => mutations.push(EntryMutation::Create {
                id: Uuid::new_v4(),
                feed_id,
                fields: entry_fields(item, new_hash, now)?,
            }),
        }
    }

    Ok(mutations)
}

fn entry_fields(
    item: &FetchedFeedItem,
    content_hash: String,
    now: DateTime<Utc>,
) -> Result<EntryFields, serde_json::Error> {
    Ok(EntryFields {
        guid: item.guid.clone(),
        title: item.title.clone().unwrap_or_default(),
        link: item.link.clone().unwrap_or_default(),
        description: item.description.clone().unwrap_or_default(),
        published_at: item.published_at,
        content_hash,
        updated_at: now,
        raw: serde_json::to_value(item)?,
    })
}
