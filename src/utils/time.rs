//! Utilidades de tiempo
//!
//! Conversión entre cadenas "HH:MM" y minutos desde medianoche.

use crate::utils::errors::{AppError, AppResult};

/// Minutos en un día completo
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Convertir una cadena "HH:MM" a minutos desde medianoche
pub fn parse_hhmm(value: &str) -> AppResult<u32> {
    let mut parts = value.split(':');

    let hours: u32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid time '{}', expected HH:MM", value)))?;
    let minutes: u32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid time '{}', expected HH:MM", value)))?;

    if parts.next().is_some() || hours > 23 || minutes > 59 {
        return Err(AppError::Validation(format!(
            "Invalid time '{}', expected HH:MM",
            value
        )));
    }

    Ok(hours * 60 + minutes)
}

/// Convertir minutos desde medianoche a una cadena "HH:MM"
pub fn minutes_to_hhmm(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm_valid() {
        assert_eq!(parse_hhmm("06:00").unwrap(), 360);
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
        assert_eq!(parse_hhmm("8:30").unwrap(), 510);
    }

    #[test]
    fn test_parse_hhmm_invalid() {
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("abc").is_err());
        assert!(parse_hhmm("12:00:00").is_err());
        assert!(parse_hhmm("").is_err());
    }

    #[test]
    fn test_minutes_to_hhmm() {
        assert_eq!(minutes_to_hhmm(360), "06:00");
        assert_eq!(minutes_to_hhmm(1439), "23:59");
        assert_eq!(minutes_to_hhmm(0), "00:00");
    }

    #[test]
    fn test_round_trip() {
        for value in ["00:00", "06:30", "14:05", "23:59"] {
            assert_eq!(minutes_to_hhmm(parse_hhmm(value).unwrap()), value);
        }
    }
}
