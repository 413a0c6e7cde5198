//! Timecode parsing: `HH:MM:SS.fff`, `MM:SS.fff`, or plain seconds.

use crate::error::DuckError;

pub fn parse_timecode(input: &str) -> Result<f64, DuckError> {
    let input = input.trim();
    if input.starts_with('-') {
        return Err(DuckError::InvalidInterval(format!(
            "timecode '{input}' is negative"
        )));
    }

    let parts: Vec<&str> = input.split(':').collect();
    let seconds = match parts.as_slice() {
        [s] => parse_component(s)?,
        [m, s] => parse_component(m)? * 60.0 + parse_component(s)?,
        [h, m, s] => parse_component(h)? * 3600.0 + parse_component(m)? * 60.0 + parse_component(s)?,
        _ => {
            return Err(DuckError::InvalidInterval(format!(
                "timecode '{input}' has too many ':'-separated components"
            )))
        }
    };

    Ok(seconds)
}

fn parse_component(s: &str) -> Result<f64, DuckError> {
    s.parse::<f64>()
        .map_err(|_| DuckError::InvalidInterval(format!("'{s}' is not a valid timecode component")))
}
