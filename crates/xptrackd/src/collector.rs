//! Daily XP collection.
//!
//! One cycle walks every registered character, skips those already logged
//! today, and inserts a fresh (level, xp) snapshot from the highscores.
//! Per-character failures are logged and never abort the cycle.

use crate::highscores::HighscoresSource;
use anyhow::Result;
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use xptrack_common::{CycleReport, XpDb};

/// Run one collection cycle for the given calendar day.
pub async fn run_cycle<S: HighscoresSource>(
    db: &Arc<Mutex<XpDb>>,
    source: &S,
    today: NaiveDate,
) -> Result<CycleReport> {
    let characters = db.lock().await.list_characters()?;
    let mut report = CycleReport {
        attempted: characters.len(),
        ..Default::default()
    };

    info!("Collection cycle for {}: {} characters", today, report.attempted);

    for character in characters {
        if db.lock().await.has_log_on(character.id, today)? {
            info!("{} already logged today, skipping", character.name);
            report.skipped += 1;
            continue;
        }

        let hit = source
            .lookup(&character.world, &character.vocation, &character.name)
            .await;

        match hit {
            Some(hit) => {
                let inserted =
                    db.lock()
                        .await
                        .insert_log(character.id, today, hit.level, hit.xp)?;
                if inserted {
                    info!(
                        "Logged {}: level {}, {} XP",
                        character.name, hit.level, hit.xp
                    );
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }
            None => {
                warn!("{} not found on the highscores", character.name);
                report.failed += 1;
            }
        }
    }

    info!(
        "Cycle done: {} inserted, {} skipped, {} failed",
        report.inserted, report.skipped, report.failed
    );
    Ok(report)
}

/// Run collection cycles forever: once at startup, then daily at `hour_utc`.
pub async fn run_scheduler<S: HighscoresSource>(
    db: Arc<Mutex<XpDb>>,
    source: Arc<S>,
    hour_utc: u32,
) {
    loop {
        let today = Utc::now().date_naive();
        if let Err(e) = run_cycle(&db, source.as_ref(), today).await {
            warn!("Collection cycle failed: {}", e);
        }

        let wait = until_next_run(hour_utc);
        info!("Next collection cycle in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;
    }
}

/// Duration until the next occurrence of `hour_utc`, at least one minute
/// away so a cycle finishing within its own hour does not rerun immediately.
fn until_next_run(hour_utc: u32) -> std::time::Duration {
    let now = Utc::now();
    let run_time = NaiveTime::from_hms_opt(hour_utc.min(23), 0, 0).unwrap_or(NaiveTime::MIN);

    let mut next = now.date_naive().and_time(run_time).and_utc();
    if next <= now + chrono::Duration::minutes(1) {
        next = (now.date_naive() + Days::new(1)).and_time(run_time).and_utc();
    }

    (next - now).to_std().unwrap_or(std::time::Duration::from_secs(3600))
}
