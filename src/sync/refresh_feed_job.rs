use super::context;
use super::queue::{FangJobQueue, RefreshRequest};
use super::refresher::{AbortReason, RefreshOutcome, Refresher};
use chrono::{DateTime, Utc};
use fang::typetag;
use fang::FangError;
use fang::Queueable;
use fang::Runnable;
use fang::Scheduled;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshFeedJob {
    request: RefreshRequest,
    run_at: Option<DateTime<Utc>>,
}

impl RefreshFeedJob {
    pub fn new(request: RefreshRequest) -> Self {
        Self {
            request,
            run_at: None,
        }
    }

    pub fn run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }

    pub fn request(&self) -> &RefreshRequest {
        &self.request
    }
}

#[typetag::serde]
impl Runnable for RefreshFeedJob {
    fn run(&self, queue: &dyn Queueable) -> Result<(), FangError> {
        let context = context::installed()?;
        let refresher = Refresher::new(context.clone());

        let outcome = refresher.execute(&self.request, &FangJobQueue::new(queue))?;

        match outcome {
            RefreshOutcome::Aborted(AbortReason::FeedNotFound) => Err(FangError {
                description: format!("Feed {} not found", self.request.feed_id),
            }),
            _ => Ok(()),
        }
    }

    fn cron(&self) -> Option<Scheduled> {
        self.run_at.map(Scheduled::ScheduleOnce)
    }

    // retries are submitted by the refresher itself
    fn max_retries(&self) -> i32 {
        0
    }

    fn task_type(&self) -> String {
        super::JOB_TYPE.to_string()
    }
}
