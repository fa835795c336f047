//! Proactive batch jobs.

mod common;

use chrono::NaiveDate;
use common::{Harness, day, uid};
use dc_core::{Goal, HabitKind, User};
use dc_engine::{Action, BatchReport, FALLBACK_TEXT, ProactiveJob, UserRepository};

fn users() -> Vec<User> {
    let mut tracker = User::new(uid("1"), "Ann");
    tracker.add_habit("Read", HabitKind::Binary).unwrap();
    let idle = User::new(uid("2"), "Bob");
    let mut quitter = User::new(uid("3"), "Cid");
    quitter.add_addiction("Sugar", "energy").unwrap();
    vec![tracker, idle, quitter]
}

#[tokio::test]
async fn test_evening_checkin_targets_users_who_track_something() {
    let h = Harness::with_users(users());

    let report = h
        .engine
        .run_job_at(ProactiveJob::EveningCheckin, day(1))
        .await
        .unwrap();

    assert_eq!(
        report,
        BatchReport {
            recipients: 2,
            delivered: 2,
            failed: 0
        }
    );
    let sent = h.transport.take();
    let recipients: Vec<&str> = sent.iter().map(|message| message.user.as_str()).collect();
    assert_eq!(recipients, vec!["1", "3"]);
    let verdicts: Vec<&Action> = sent[0].keyboard.as_ref().unwrap().actions().collect();
    assert_eq!(
        verdicts,
        vec![
            &Action::DayVerdict { won: true },
            &Action::DayVerdict { won: false }
        ]
    );
}

/// One rejected recipient does not stop the batch.
#[tokio::test]
async fn test_batch_continues_after_delivery_failure() {
    let h = Harness::with_users(users());
    h.transport.reject(&uid("1"));

    let report = h
        .engine
        .run_job_at(ProactiveJob::DailyMotivation, day(1))
        .await
        .unwrap();

    assert_eq!(
        report,
        BatchReport {
            recipients: 3,
            delivered: 2,
            failed: 1
        }
    );
    assert_eq!(h.texts(), vec!["☀️ [normal] generated"; 2]);
}

#[tokio::test]
async fn test_daily_motivation_falls_back_when_generator_is_down() {
    let h = Harness::with_users(users());
    h.generator.go_down();

    let report = h
        .engine
        .run_job_at(ProactiveJob::DailyMotivation, day(1))
        .await
        .unwrap();

    assert_eq!(report.delivered, 3);
    assert!(
        h.texts()
            .iter()
            .all(|text| *text == format!("☀️ {FALLBACK_TEXT}"))
    );
}

/// One reminder per user, covering all of their active goals.
#[tokio::test]
async fn test_goal_reminder_groups_goals_by_user() {
    let h = Harness::with_users(users());
    let date = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
    for goal in [
        Goal::new(uid("1"), "Ship the beta", date(20), day(1)),
        Goal::new(uid("1"), "Read 4 books", date(9), day(1)),
        Goal::new(uid("3"), "Run 10k", date(11), day(1)),
    ] {
        h.repo.inner.insert_goal(&goal).await.unwrap();
    }

    let report = h
        .engine
        .run_job_at(ProactiveJob::GoalReminder, day(10))
        .await
        .unwrap();

    assert_eq!(report.recipients, 2);
    let sent = h.transport.take();
    assert_eq!(sent[0].user, uid("1"));
    assert_eq!(
        sent[0].text,
        "🎯 Your goals:\n- Read 4 books (2025-03-09): deadline passed\n- Ship the beta (2025-03-20): 10 days left"
    );
    assert_eq!(sent[1].text, "🎯 Your goals:\n- Run 10k (2025-03-11): 1 day left");
}

#[tokio::test]
async fn test_jobs_with_no_users_send_nothing() {
    let h = Harness::new();
    for job in ProactiveJob::ALL {
        let report = h.engine.run_job_at(job, day(1)).await.unwrap();
        assert_eq!(report, BatchReport::default());
    }
    assert!(h.texts().is_empty());
}
