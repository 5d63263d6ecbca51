//! Statistics derivation engine.
//!
//! Pure transformations over an ordered sequence of (date, level, xp)
//! samples for a single character: daily deltas, secant-slope moving
//! averages, the hunting-intensity heatmap, milestone detection, streaks,
//! and the +100 levels projection.
//!
//! The engine holds no state and performs no I/O. Callers supply samples
//! ascending by date (the store's query guarantees this); out-of-order or
//! duplicate-date input is tolerated without panicking but yields the same
//! skewed deltas the raw data implies. The only wall-clock input is `today`,
//! passed explicitly so results are reproducible in tests.

use crate::levels;
use crate::types::{
    BestDay, Character, CharacterStatistics, CharacterSummary, DailyXpEntry, ExperienceSample,
    HEATMAP_DAYS, HEATMAP_WEEKS,
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// Milestone levels whose first-achieved date is tracked for display.
pub const MILESTONE_LEVELS: [u32; 6] = [200, 400, 600, 800, 900, 1000];

/// Fallback XP/day used for the projection when no positive average exists.
const FALLBACK_DAILY_XP: i64 = 1000;

/// Samples in the short averaging window.
const SHORT_WINDOW: usize = 7;

/// Samples in the long averaging window.
const LONG_WINDOW: usize = 30;

/// Compute full derived statistics for one character, as of `today`.
///
/// With a single sample every delta-dependent field degenerates to zero or
/// empty; with zero samples the caller-facing API should report "no data"
/// instead of calling this, but the result is still well defined.
pub fn compute(
    character: &Character,
    samples: &[ExperienceSample],
    today: NaiveDate,
) -> CharacterStatistics {
    let last = samples.last();
    let level = last.map(|s| s.level).unwrap_or(0);
    let total_xp = last.map(|s| s.xp).unwrap_or(0);

    let daily_average = daily_average(samples);
    let daily_xp_series = daily_xp_series(samples);
    let activity_heatmap = activity_heatmap(samples);
    let milestone_dates = milestone_dates(samples);
    let estimated_date_for_next_100_levels = if samples.is_empty() {
        None
    } else {
        estimate_next_100_levels(level, total_xp, &daily_xp_series, daily_average, today)
    };
    let streak_count = streak_count(&daily_xp_series);
    let best_day = best_day(&daily_xp_series);
    let consistency_ratio = consistency_ratio(samples, today);

    CharacterStatistics {
        name: character.name.clone(),
        world: character.world.clone(),
        vocation: character.vocation.clone(),
        level,
        total_xp,
        daily_average,
        days_tracked: samples.len(),
        daily_xp_series,
        activity_heatmap,
        milestone_dates,
        estimated_date_for_next_100_levels,
        streak_count,
        best_day,
        consistency_ratio,
    }
}

/// Compute statistics as of the current UTC date.
pub fn compute_now(character: &Character, samples: &[ExperienceSample]) -> CharacterStatistics {
    compute(character, samples, Utc::now().date_naive())
}

/// Compact summary for the dashboard card and the per-character stats route.
pub fn summarize(character: &Character, samples: &[ExperienceSample]) -> CharacterSummary {
    let last = samples.last();
    CharacterSummary {
        name: character.name.clone(),
        level: last.map(|s| s.level).unwrap_or(0),
        total_xp: last.map(|s| s.xp).unwrap_or(0),
        daily_average: daily_average(samples),
        days_tracked: samples.len(),
    }
}

/// XP/day over the most recent `min(7, N)` samples.
///
/// Secant slope between the first and last sample of the window, treating
/// samples as days. Zero when fewer than two samples exist.
pub fn daily_average(samples: &[ExperienceSample]) -> i64 {
    if samples.len() < 2 {
        return 0;
    }

    let start = samples.len().saturating_sub(SHORT_WINDOW);
    let window = &samples[start..];
    secant_slope(window).map(round).unwrap_or(0)
}

/// Per-day XP deltas with trailing 7- and 30-sample moving averages.
///
/// One entry per sample after the first. Both averages are secant slopes
/// over the trailing window ending at the entry; a degenerate one-sample
/// window falls back to the entry's own delta.
pub fn daily_xp_series(samples: &[ExperienceSample]) -> Vec<DailyXpEntry> {
    let mut series = Vec::with_capacity(samples.len().saturating_sub(1));

    for i in 1..samples.len() {
        let daily_xp = samples[i].xp - samples[i - 1].xp;

        let window7 = &samples[i.saturating_sub(SHORT_WINDOW - 1)..=i];
        let moving_avg_7 = secant_slope(window7).map(round).unwrap_or(daily_xp);

        let window30 = &samples[i.saturating_sub(LONG_WINDOW - 1)..=i];
        let moving_avg_30 = secant_slope(window30).map(round).unwrap_or(daily_xp);

        series.push(DailyXpEntry {
            date: samples[i].date,
            daily_xp,
            moving_avg_7,
            moving_avg_30,
        });
    }

    series
}

/// 52x7 grid of average XP/hour by week-of-year and weekday (Sunday = 0).
///
/// Weeks are simple `day_of_year / 7` buckets capped at 51, not ISO weeks;
/// the drift at year end is accepted (see DESIGN.md). Each sample after the
/// first contributes its XP delta divided by the hours elapsed since the
/// previous sample; cells average their contributions.
pub fn activity_heatmap(samples: &[ExperienceSample]) -> Vec<Vec<f64>> {
    let mut grid = vec![vec![0.0f64; HEATMAP_DAYS]; HEATMAP_WEEKS];
    let mut counts = vec![vec![0u32; HEATMAP_DAYS]; HEATMAP_WEEKS];

    for (i, sample) in samples.iter().enumerate() {
        let week = (sample.date.ordinal0() as usize / 7).min(HEATMAP_WEEKS - 1);
        let day = sample.date.weekday().num_days_from_sunday() as usize;

        // The first sample has no previous point to diff against.
        let mut activity = 0.0;
        if i > 0 {
            let prev = &samples[i - 1];
            let hours = (sample.date - prev.date).num_hours();
            if hours > 0 {
                activity = (sample.xp - prev.xp) as f64 / hours as f64;
            }
        }

        grid[week][day] += activity;
        counts[week][day] += 1;
    }

    for week in 0..HEATMAP_WEEKS {
        for day in 0..HEATMAP_DAYS {
            if counts[week][day] > 0 {
                grid[week][day] /= f64::from(counts[week][day]);
            }
        }
    }

    grid
}

/// First date each milestone level was reached, None while unreached.
pub fn milestone_dates(samples: &[ExperienceSample]) -> BTreeMap<u32, Option<NaiveDate>> {
    MILESTONE_LEVELS
        .iter()
        .map(|&target| {
            let reached = samples.iter().find(|s| s.level >= target).map(|s| s.date);
            (target, reached)
        })
        .collect()
}

/// Estimated date to gain 100 levels from the latest sample.
///
/// Uses the most recent 30-sample average when available, else the short
/// daily average, else a fixed 1000 XP/day floor; always lands at least one
/// day in the future. Relative to `today`, so re-running on a later date
/// moves the estimate.
pub fn estimate_next_100_levels(
    level: u32,
    total_xp: i64,
    series: &[DailyXpEntry],
    daily_average: i64,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let target = level + 100;
    let xp_needed = levels::xp_to_level(total_xp, target);

    let mut average = series
        .last()
        .map(|e| e.moving_avg_30)
        .unwrap_or(daily_average);
    if average <= 0 {
        average = FALLBACK_DAILY_XP;
    }

    let mut days_needed = (xp_needed as f64 / average as f64).ceil() as i64;
    if days_needed <= 0 {
        days_needed = 1;
    }

    today.checked_add_days(Days::new(days_needed as u64))
}

/// Consecutive recent entries outperforming their own 30-sample average.
pub fn streak_count(series: &[DailyXpEntry]) -> u32 {
    series
        .iter()
        .rev()
        .take_while(|e| e.daily_xp > e.moving_avg_30)
        .count() as u32
}

/// The entry with the highest daily XP; first occurrence wins ties.
pub fn best_day(series: &[DailyXpEntry]) -> Option<BestDay> {
    let mut best: Option<BestDay> = None;
    for entry in series {
        if best.map(|b| entry.daily_xp > b.daily_xp).unwrap_or(true) {
            best = Some(BestDay {
                date: entry.date,
                daily_xp: entry.daily_xp,
            });
        }
    }
    best
}

/// Percentage of calendar days this year with a sample, relative to `today`.
pub fn consistency_ratio(samples: &[ExperienceSample], today: NaiveDate) -> i64 {
    let played: HashSet<NaiveDate> = samples
        .iter()
        .filter(|s| s.date.year() == today.year())
        .map(|s| s.date)
        .collect();

    // Day-of-year counts Jan 1 as day 1, matching ceil(ms_since_jan1 / day).
    let elapsed = i64::from(today.ordinal());
    if elapsed == 0 {
        return 0;
    }

    round(played.len() as f64 / elapsed as f64 * 100.0)
}

/// Average rate of change between the first and last point of a window,
/// ignoring intermediate points. None for windows of fewer than 2 samples.
fn secant_slope(window: &[ExperienceSample]) -> Option<f64> {
    if window.len() < 2 {
        return None;
    }
    let first = window.first()?;
    let last = window.last()?;
    Some((last.xp - first.xp) as f64 / (window.len() - 1) as f64)
}

fn round(value: f64) -> i64 {
    value.round() as i64
}
