use std::time::Duration;

use super::MonitorStats;

/// Print the end-of-session summary
pub fn display_summary(stats: &MonitorStats, exit_reason: &str, elapsed: Duration) {
    eprintln!(
        "\n{exit_reason}: {:.1}s, {} events ({} undecodable, {} not written)",
        elapsed.as_secs_f64(),
        stats.event_count,
        stats.decode_errors,
        stats.dropped,
    );

    if !stats.commands.is_empty() {
        eprintln!("commands:");
        for (command, count) in &stats.commands {
            eprintln!("  {command}: {count}");
        }
    }
    if !stats.loaded_programs.is_empty() {
        eprintln!("loaded programs: {}", join(&stats.loaded_programs));
    }
    if !stats.created_maps.is_empty() {
        eprintln!("created maps: {}", join(&stats.created_maps));
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
