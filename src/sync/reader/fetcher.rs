use crate::sync::reader::{FeedMetadata, FeedReaderError, FetchedFeed, FetchedFeedItem, ReadFeed};
use feed_rs::model::Feed;
use feed_rs::parser;
use isahc::{HttpClient, Request};
use std::io;

pub struct Fetcher {
    client: HttpClient,
}

impl Fetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn read_url(&self, url: &str) -> Result<Vec<u8>, FeedReaderError> {
        let request = Request::get(url)
            .body(())
            .map_err(|_| FeedReaderError::InvalidUrl {
                url: url.to_string(),
            })?;

        match self.client.send(request) {
            Ok(mut response) => {
                if !response.status().is_success() {
                    return Err(FeedReaderError::Status {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }

                let mut writer: Vec<u8> = vec![];

                if let Err(err) = io::copy(response.body_mut(), &mut writer) {
                    return Err(FeedReaderError::Request {
                        url: url.to_string(),
                        msg: format!("{err}"),
                    });
                }

                Ok(writer)
            }
            Err(error) if error.is_timeout() => Err(FeedReaderError::Timeout {
                url: url.to_string(),
            }),
            Err(error) => Err(FeedReaderError::Request {
                url: url.to_string(),
                msg: format!("{error}"),
            }),
        }
    }
}

impl ReadFeed for Fetcher {
    fn read(&self, url: &str) -> Result<FetchedFeed, FeedReaderError> {
        let body = self.read_url(url)?;

        parse(url, &body)
    }
}

pub fn parse(url: &str, data: &[u8]) -> Result<FetchedFeed, FeedReaderError> {
    // entries without an id keep an empty one instead of a generated id
    let parser = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build();

    match parser.parse(data) {
        Ok(feed) => Ok(FetchedFeed::from(feed)),
        Err(err) => Err(FeedReaderError::Malformed {
            url: url.to_string(),
            msg: format!("{err:?}"),
        }),
    }
}

impl From<Feed> for FetchedFeed {
    fn from(feed: Feed) -> Self {
        let items = feed
            .entries
            .into_iter()
            .map(|entry| FetchedFeedItem {
                guid: Some(entry.id).filter(|id| !id.is_empty()),
                title: entry.title.map(|text| text.content),
                link: entry.links.first().map(|link| link.href.clone()),
                description: entry
                    .summary
                    .map(|text| text.content)
                    .or_else(|| entry.content.and_then(|content| content.body)),
                published_at: entry.published.or(entry.updated),
            })
            .collect::<Vec<FetchedFeedItem>>();

        let metadata = FeedMetadata {
            title: feed.title.map(|text| text.content),
            link: feed.links.first().map(|link| link.href.clone()),
            description: feed.description.map(|text| text.content),
            published_at: feed.published.or(feed.updated),
        };

        FetchedFeed { metadata, items }
    }
}

#[cfg(test)]
mod tests {
    use super::Fetcher;
    use crate::config::Config;
    use crate::http_client;
    use crate::db;
    use crate::models::FeedEntry;
    use crate::sync::reader::{FeedReaderError, ReadFeed};
    use crate::sync::reconcile;
    use chrono::DateTime;
    use std::collections::HashMap;
    use std::fs;
    use uuid::Uuid;

    fn fetcher() -> Fetcher {
        let config = Config::builder()
            .database_url("postgres://localhost/feed_sync_test")
            .build();

        Fetcher::new(http_client::build(&config).unwrap())
    }

    #[test]
    fn it_reads_rss_feed() {
        let response = fs::read_to_string("./tests/support/rss_feed_example.xml").unwrap();
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body(response)
            .create();
        let url = format!("{}/feed", server.url());

        let fetched_feed = fetcher().read(&url).unwrap();

        assert_eq!(fetched_feed.metadata.title, Some("Example Feed".to_string()));
        assert_eq!(
            fetched_feed.metadata.description,
            Some("News from example.com".to_string())
        );
        assert_eq!(fetched_feed.items.len(), 2);

        let first_item = &fetched_feed.items[0];

        assert_eq!(first_item.guid, Some("item-1".to_string()));
        assert_eq!(first_item.title, Some("First post".to_string()));
        assert_eq!(
            first_item.link,
            Some("https://example.com/first".to_string())
        );
        assert_eq!(
            first_item.published_at,
            Some(
                DateTime::parse_from_rfc3339("2004-10-19T11:09:11Z")
                    .unwrap()
                    .into()
            )
        );
    }

    #[test]
    fn it_fails_on_unsuccessful_status() {
        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/feed").with_status(503).create();
        let url = format!("{}/feed", server.url());

        let result = fetcher().read(&url);

        assert_eq!(result, Err(FeedReaderError::Status { url, status: 503 }));
    }

    #[test]
    fn it_fails_on_malformed_document() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body("definitely not a feed")
            .create();
        let url = format!("{}/feed", server.url());

        let result = fetcher().read(&url);

        assert!(matches!(result, Err(FeedReaderError::Malformed { .. })));
    }

    #[test]
    fn it_converts_atom_feed() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <link href="http://example.org/"/>
  <updated>2003-12-13T18:30:02Z</updated>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2003-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
  </entry>
</feed>"#;

        let fetched_feed = super::parse("http://example.org/feed", atom.as_bytes()).unwrap();

        assert_eq!(fetched_feed.metadata.title, Some("Example Atom".to_string()));
        assert_eq!(
            fetched_feed.metadata.published_at,
            Some(
                DateTime::parse_from_rfc3339("2003-12-13T18:30:02Z")
                    .unwrap()
                    .into()
            )
        );
        assert_eq!(
            fetched_feed.items[0].guid,
            Some("urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a".to_string())
        );
        assert_eq!(fetched_feed.items[0].description, Some("Some text.".to_string()));
    }

    #[test]
    fn it_keeps_entries_without_guid_unmatched() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>No guids</title>
    <link>https://example.com/</link>
    <description>Items without guid</description>
    <item>
      <title>Untitled post</title>
      <link>https://example.com/untitled</link>
    </item>
  </channel>
</rss>"#;

        let fetched_feed = super::parse("https://example.com/feed", rss.as_bytes()).unwrap();
        let item = &fetched_feed.items[0];

        assert_eq!(item.guid, None);
        assert_eq!(item.title, Some("Untitled post".to_string()));

        let feed_id = Uuid::new_v4();
        let now = db::current_time();
        let first =
            reconcile::reconcile_entries(feed_id, &HashMap::new(), &fetched_feed.items, now)
                .unwrap();
        let stored: HashMap<String, FeedEntry> = first
            .iter()
            .filter_map(|mutation| mutation.to_new_entry())
            .filter_map(|entry| entry.guid.clone().map(|guid| (guid, entry)))
            .collect();

        let again = super::parse("https://example.com/feed", rss.as_bytes()).unwrap();
        let second = reconcile::reconcile_entries(feed_id, &stored, &again.items, now).unwrap();

        assert_eq!(second.len(), 1);
        assert!(second[0].is_create());
    }
}
