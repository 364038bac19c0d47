use chrono::TimeDelta;

/// Hours and minutes, without wrapping past a day.
pub trait FormatHM {
    fn format_hm(&self) -> String;
}

impl FormatHM for TimeDelta {
    fn format_hm(&self) -> String {
        let sign = if *self < TimeDelta::zero() { "-" } else { "" };
        let delta = self.abs();
        format!(
            "{sign}{:02}:{:02}",
            delta.num_hours(),
            delta.num_minutes() % 60
        )
    }
}
