//! Run a proactive job once.

use std::io::Write;

use anyhow::{Context, Result};
use dc_engine::{Engine, ProactiveJob};

pub async fn run<W: Write>(writer: &mut W, engine: &Engine, job: ProactiveJob) -> Result<()> {
    let report = engine
        .run_job(job)
        .await
        .with_context(|| format!("job {job} failed"))?;
    writeln!(
        writer,
        "{job}: {}/{} delivered, {} failed",
        report.delivered, report.recipients, report.failed
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::commands::testing::{console_engine, output, seeded_db};

    #[tokio::test]
    async fn test_evening_checkin_prints_verdict_prompts() {
        let (engine, transport) = console_engine(seeded_db());
        let mut summary = Vec::new();

        run(&mut summary, &engine, ProactiveJob::EveningCheckin)
            .await
            .unwrap();

        assert_snapshot!(String::from_utf8(summary).unwrap(), @"evening-checkin: 2/2 delivered, 0 failed");
        assert_snapshot!(output(&transport), @r"
        [1] 🌙 The day is over. Did you win or lose?
            [🏆 I won] !verdict_won  [💀 I lost] !verdict_lost
        [3] 🌙 The day is over. Did you win or lose?
            [🏆 I won] !verdict_won  [💀 I lost] !verdict_lost
        ");
    }

    #[tokio::test]
    async fn test_motivation_without_generator_uses_fallback() {
        let (engine, transport) = console_engine(seeded_db());
        let mut summary = Vec::new();

        run(&mut summary, &engine, ProactiveJob::DailyMotivation)
            .await
            .unwrap();

        let printed = output(&transport);
        assert_eq!(
            printed.matches(dc_engine::FALLBACK_TEXT).count(),
            3,
            "{printed}"
        );
    }
}
