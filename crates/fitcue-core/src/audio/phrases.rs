//! Helpers for text that is going to be spoken.

fn unit(n: u32, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Duration in words, e.g. "1 minute and 30 seconds".
pub fn format_duration(seconds: u32) -> String {
    if seconds < 60 {
        return unit(seconds, "second", "seconds");
    }
    if seconds < 3600 {
        let mins = seconds / 60;
        let secs = seconds % 60;
        return if secs == 0 {
            unit(mins, "minute", "minutes")
        } else {
            format!(
                "{} and {}",
                unit(mins, "minute", "minutes"),
                unit(secs, "second", "seconds")
            )
        };
    }
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    if mins == 0 {
        unit(hours, "hour", "hours")
    } else {
        format!(
            "{} and {}",
            unit(hours, "hour", "hours"),
            unit(mins, "minute", "minutes")
        )
    }
}

/// Clock-style `m:ss` for on-screen countdowns.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
