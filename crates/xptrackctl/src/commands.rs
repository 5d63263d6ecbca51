//! Command implementations and terminal output.

use crate::client::DaemonClient;
use anyhow::Result;
use owo_colors::OwoColorize;
use xptrack_common::NewCharacter;

pub async fn status(client: &DaemonClient) -> Result<()> {
    let health = client.health().await?;
    println!("{}", "xptrackd status".bold());
    println!(
        "  version:    {}",
        health["version"].as_str().unwrap_or("?")
    );
    println!("  uptime:     {}s", health["uptimeSecs"].as_u64().unwrap_or(0));
    println!(
        "  characters: {}",
        health["characters"].as_u64().unwrap_or(0)
    );
    Ok(())
}

pub async fn add(client: &DaemonClient, name: String, world: String, vocation: String) -> Result<()> {
    let character = client
        .add_character(&NewCharacter { name, world, vocation })
        .await?;
    println!(
        "{} {} ({} / {})",
        "Tracking".green().bold(),
        character.name.bold(),
        character.world,
        character.vocation
    );
    Ok(())
}

pub async fn list(client: &DaemonClient) -> Result<()> {
    let characters = client.list_characters().await?;
    if characters.is_empty() {
        println!("No characters tracked yet. Add one with `xptrackctl add`.");
        return Ok(());
    }

    println!(
        "{:<24} {:<14} {:<12} {:>7} {:>16} {:>6}",
        "NAME".bold(),
        "WORLD".bold(),
        "VOCATION".bold(),
        "LEVEL".bold(),
        "TOTAL XP".bold(),
        "DAYS".bold()
    );
    for character in characters {
        match client.character_summary(character.id).await {
            Ok(summary) => println!(
                "{:<24} {:<14} {:<12} {:>7} {:>16} {:>6}",
                summary.name,
                character.world,
                character.vocation,
                summary.level,
                format_xp(summary.total_xp),
                summary.days_tracked
            ),
            // No logs yet: show the registry row anyway.
            Err(_) => println!(
                "{:<24} {:<14} {:<12} {:>7} {:>16} {:>6}",
                character.name,
                character.world,
                character.vocation,
                "-",
                "-",
                0
            ),
        }
    }
    Ok(())
}

pub async fn remove(client: &DaemonClient, name: &str) -> Result<()> {
    let character = client.find_character(name).await?;
    client.remove_character(character.id).await?;
    println!("{} {}", "Removed".red().bold(), character.name);
    Ok(())
}

pub async fn stats(client: &DaemonClient, name: &str) -> Result<()> {
    let character = client.find_character(name).await?;
    let statistics = client.character_statistics(character.id).await?;

    println!(
        "{} ({} / {})",
        statistics.name.bold(),
        statistics.world,
        statistics.vocation
    );
    println!("  level:        {}", statistics.level.to_string().cyan());
    println!("  total XP:     {}", format_xp(statistics.total_xp));
    println!("  XP/day (7):   {}", format_xp(statistics.daily_average));
    println!("  days tracked: {}", statistics.days_tracked);
    println!("  streak:       {}d", statistics.streak_count);
    println!("  consistency:  {}%", statistics.consistency_ratio);

    if let Some(best) = statistics.best_day {
        println!(
            "  best day:     {} ({})",
            format_xp(best.daily_xp).green(),
            best.date
        );
    }

    if let Some(eta) = statistics.estimated_date_for_next_100_levels {
        println!(
            "  level {} by: {}",
            statistics.level + 100,
            eta.to_string().yellow()
        );
    }

    let reached: Vec<String> = statistics
        .milestone_dates
        .iter()
        .filter_map(|(level, date)| date.map(|d| format!("{} on {}", level, d)))
        .collect();
    if !reached.is_empty() {
        println!("  milestones:   {}", reached.join(", "));
    }

    Ok(())
}

pub async fn fetch(client: &DaemonClient) -> Result<()> {
    println!("Triggering collection cycle...");
    let report = client.trigger_fetch().await?;
    println!(
        "{}: {} inserted, {} skipped, {} failed (of {})",
        "Done".green().bold(),
        report.inserted,
        report.skipped,
        report.failed,
        report.attempted
    );
    Ok(())
}

/// Group thousands for readability: 1234567 -> "1,234,567".
fn format_xp(xp: i64) -> String {
    let negative = xp < 0;
    let digits: Vec<char> = xp.abs().to_string().chars().rev().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    let grouped: String = out.chars().rev().collect();
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::format_xp;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_xp(0), "0");
        assert_eq!(format_xp(950), "950");
        assert_eq!(format_xp(7550), "7,550");
        assert_eq!(format_xp(1_234_567_890), "1,234,567,890");
        assert_eq!(format_xp(-7550), "-7,550");
    }
}
