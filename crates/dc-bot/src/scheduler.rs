//! Daily triggers for the proactive jobs.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use dc_engine::{Engine, ProactiveJob};
use tokio::task::JoinHandle;

/// The first instant strictly after `now` whose local time in `tz` is `at`.
///
/// A local time skipped by a DST transition moves to the following day.
pub fn next_run(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    (0..=2)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|date| tz.from_local_datetime(&date.and_time(at)).earliest())
        .map(|local| local.with_timezone(&Utc))
        .find(|candidate| *candidate > now)
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}

/// Starts one background task per job, each firing once a day.
pub fn spawn(
    engine: Arc<Engine>,
    entries: Vec<(ProactiveJob, NaiveTime)>,
    tz: Tz,
) -> Vec<JoinHandle<()>> {
    entries
        .into_iter()
        .map(|(job, at)| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                loop {
                    let now = Utc::now();
                    let due = next_run(now, at, tz);
                    tracing::debug!(%job, %due, "scheduled job");
                    let wait = (due - now).to_std().unwrap_or_default();
                    tokio::time::sleep(wait).await;

                    match engine.run_job(job).await {
                        Ok(report) => tracing::debug!(%job, ?report, "scheduled job finished"),
                        Err(err) => tracing::error!(%job, error = %err, "scheduled job failed"),
                    }
                }
            })
        })
        .collect()
}
