use crate::config::Config;
use crate::lock::LockStore;
use crate::store::FeedStore;
use crate::sync::reader::ReadFeed;
use fang::FangError;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use typed_builder::TypedBuilder;

static CONTEXT: OnceCell<SyncContext> = OnceCell::new();

#[derive(Clone, TypedBuilder)]
pub struct SyncContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn FeedStore>,
    pub locks: Arc<dyn LockStore>,
    pub reader: Arc<dyn ReadFeed>,
}

/// Makes `context` available to queue tasks, which are deserialized by the
/// worker pool and cannot receive it any other way. Only the first call wins.
pub fn install(context: SyncContext) -> Result<(), SyncContext> {
    CONTEXT.set(context)
}

pub fn installed() -> Result<&'static SyncContext, FangError> {
    CONTEXT.get().ok_or_else(|| FangError {
        description: "sync context is not installed".to_string(),
    })
}
