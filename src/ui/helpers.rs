use chrono::Duration;

/// Renders a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Pads or truncates `value` to exactly `width` characters.
pub fn clamp_name(value: &str, width: usize) -> String {
    let value_len = value.chars().count();
    if value_len <= width {
        return format!("{value:<width$}", width = width);
    }
    if width < 2 {
        return value.chars().take(width).collect();
    }
    let trimmed = value
        .chars()
        .take(width.saturating_sub(2))
        .collect::<String>();
    format!("{trimmed}..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_render_past_a_day() {
        assert_eq!(format_duration(Duration::seconds(3723)), "01:02:03");
        assert_eq!(format_duration(Duration::hours(26)), "26:00:00");
        assert_eq!(format_duration(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn names_are_padded_or_cut() {
        assert_eq!(clamp_name("code", 6), "code  ");
        assert_eq!(clamp_name("browser", 5), "bro..");
    }

    #[test]
    fn narrow_widths_never_overflow() {
        assert_eq!(clamp_name("browser", 1), "b");
        assert_eq!(clamp_name("browser", 0), "");
        assert_eq!(clamp_name("browser", 2), "..");
    }
}
