use super::context;
use super::queue::FangJobQueue;
use super::scheduler::Scheduler;
use fang::typetag;
use fang::FangError;
use fang::Queueable;
use fang::Runnable;
use fang::Scheduled;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshAllFeedsJob {
    cron_pattern: String,
}

impl RefreshAllFeedsJob {
    pub fn new(cron_pattern: String) -> Self {
        Self { cron_pattern }
    }
}

#[typetag::serde]
impl Runnable for RefreshAllFeedsJob {
    fn run(&self, queue: &dyn Queueable) -> Result<(), FangError> {
        let context = context::installed()?;

        let report = Scheduler::new(context.clone()).refresh_all(&FangJobQueue::new(queue))?;

        log::info!("Dispatched {} feeds", report.total());

        Ok(())
    }

    fn cron(&self) -> Option<Scheduled> {
        Some(Scheduled::CronPattern(self.cron_pattern.clone()))
    }

    fn uniq(&self) -> bool {
        true
    }

    // the next cron tick is the retry
    fn max_retries(&self) -> i32 {
        0
    }

    fn task_type(&self) -> String {
        super::JOB_TYPE.to_string()
    }
}
