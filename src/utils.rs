// Utility functions
use chrono::{Duration, Local, NaiveDate};
use sha2::{Digest, Sha256};

/// Current local date; all lifecycle dates are day-granular.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses listing date text: ISO dates, Swiss "dd.mm.yyyy" and the relative
/// words "Heute" / "Gestern" used by marketplaces.
pub fn parse_date(date_str: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = date_str.trim();
    let lower = text.to_lowercase();
    if lower.starts_with("heute") {
        return Some(reference);
    }
    if lower.starts_with("gestern") {
        return Some(reference - Duration::days(1));
    }
    let head = text.split(|c: char| c.is_whitespace() || c == 'T').next().unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d.%m.%Y"))
        .or_else(|_| NaiveDate::parse_from_str(head, "%d.%m.%y"))
        .ok()
}

/// Deterministic short hash of a text, used for synthetic sale ids and cache keys.
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_dates() {
        let reference = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(parse_date("Heute, 14:02", reference), Some(reference));
        assert_eq!(
            parse_date("Gestern", reference),
            NaiveDate::from_ymd_opt(2026, 10, 17)
        );
        assert_eq!(
            parse_date("03.09.2026", reference),
            NaiveDate::from_ymd_opt(2026, 9, 3)
        );
        assert_eq!(
            parse_date("2026-09-03T10:00:00Z", reference),
            NaiveDate::from_ymd_opt(2026, 9, 3)
        );
        assert_eq!(parse_date("irgendwann", reference), None);
    }

    #[test]
    fn hash_is_stable_and_short() {
        assert_eq!(hash_text("Tisch"), hash_text("Tisch"));
        assert_ne!(hash_text("Tisch"), hash_text("Stuhl"));
        assert_eq!(hash_text("Tisch").len(), 16);
    }
}
