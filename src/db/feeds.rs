use crate::models::feed::Feed;
use crate::schema::feeds;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error;
use diesel::upsert::excluded;
use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

#[derive(Insertable)]
#[diesel(table_name = feeds)]
struct NewFeed {
    id: Uuid,
    url: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = feeds)]
struct FeedChangeset {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    content_hash: Option<String>,
    raw: Option<serde_json::Value>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<&Feed> for FeedChangeset {
    fn from(feed: &Feed) -> Self {
        Self {
            title: feed.title.clone(),
            link: feed.link.clone(),
            description: feed.description.clone(),
            published_at: feed.published_at,
            content_hash: feed.content_hash.clone(),
            raw: feed.raw.clone(),
            updated_at: feed.updated_at,
        }
    }
}

pub fn create(conn: &mut PgConnection, url: String) -> Result<Feed, Error> {
    let new_feed = NewFeed {
        id: Uuid::new_v4(),
        url: url.trim().to_string(),
    };

    diesel::insert_into(feeds::table)
        .values(new_feed)
        .on_conflict(feeds::url)
        .do_update()
        .set(feeds::url.eq(excluded(feeds::url)))
        .get_result::<Feed>(conn)
}

pub fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Feed>, Error> {
    feeds::table.find(id).first::<Feed>(conn).optional()
}

pub fn load_feeds(conn: &mut PgConnection, page: i64, count: i64) -> Result<Vec<Feed>, Error> {
    let offset = (page - 1) * count;

    feeds::table
        .order(feeds::id)
        .limit(count)
        .offset(offset)
        .load::<Feed>(conn)
}

pub fn update_metadata(conn: &mut PgConnection, feed: &Feed) -> Result<usize, Error> {
    diesel::update(feeds::table.find(feed.id))
        .set(FeedChangeset::from(feed))
        .execute(conn)
}

pub fn set_should_retry(
    conn: &mut PgConnection,
    id: Uuid,
    should_retry: bool,
) -> Result<usize, Error> {
    diesel::update(feeds::table.find(id))
        .set(feeds::should_retry.eq(should_retry))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::sync::reader::{FeedMetadata, FetchedFeed};
    use crate::sync::reconcile;
    use diesel::connection::Connection;
    use diesel::result::Error;

    #[test]
    #[ignore]
    fn create_returns_existing_feed_for_known_url() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let feed = super::create(connection, "https://example.com/feed".to_string())?;
            let same_feed = super::create(connection, " https://example.com/feed ".to_string())?;

            assert_eq!(feed.id, same_feed.id);
            assert!(feed.should_retry);
            assert_eq!(feed.title, None);

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn update_metadata_saves_reconciled_feed() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let mut feed = super::create(connection, "https://example.com/feed".to_string())?;
            let fetched = FetchedFeed {
                metadata: FeedMetadata {
                    title: Some("Title".to_string()),
                    ..Default::default()
                },
                items: vec![],
            };

            let mutation = reconcile::reconcile_feed(&feed, &fetched, db::current_time())
                .unwrap()
                .unwrap();
            mutation.apply_to(&mut feed);

            assert_eq!(super::update_metadata(connection, &feed)?, 1);

            let updated_feed = super::find(connection, feed.id)?.unwrap();

            assert_eq!(updated_feed.title, Some("Title".to_string()));
            assert_eq!(updated_feed.content_hash, Some(mutation.content_hash));
            assert_eq!(updated_feed.published_at, None);

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn set_should_retry_updates_flag() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let feed = super::create(connection, "https://example.com/feed".to_string())?;

            assert_eq!(super::set_should_retry(connection, feed.id, false)?, 1);
            assert!(!super::find(connection, feed.id)?.unwrap().should_retry);

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn load_feeds_pages_feeds() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            for index in 0..3 {
                super::create(connection, format!("https://example.com/{index}"))?;
            }

            let first_page = super::load_feeds(connection, 1, 2)?;
            let second_page = super::load_feeds(connection, 2, 2)?;

            assert_eq!(first_page.len(), 2);
            assert!(!second_page.is_empty());
            assert!(first_page[1].id < second_page[0].id);

            Ok(())
        });
    }
}
