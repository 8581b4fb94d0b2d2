table! {
    feed_entries (id) {
        id -> Uuid,
        feed_id -> Uuid,
        guid -> Nullable<Text>,
        title -> Nullable<Text>,
        link -> Nullable<Text>,
        description -> Nullable<Text>,
        published_at -> Nullable<Timestamptz>,
        content_hash -> Nullable<Text>,
        raw -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    feeds (id) {
        id -> Uuid,
        url -> Text,
        title -> Nullable<Text>,
        link -> Nullable<Text>,
        description -> Nullable<Text>,
        published_at -> Nullable<Timestamptz>,
        content_hash -> Nullable<Text>,
        should_retry -> Bool,
        raw -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

joinable!(feed_entries -> feeds (feed_id));

allow_tables_to_appear_in_same_query!(feed_entries, feeds,);
