use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const JOB_PREFIX: &str = "JOB";
pub const ESTIMATE_PREFIX: &str = "EST";
pub const INVOICE_PREFIX: &str = "INV";
pub const PURCHASE_ORDER_PREFIX: &str = "PO";

/// Human-facing document number: `<PREFIX>-YYYYMMDD-XXXXXX`
pub fn document_number(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_ascii_uppercase();
    format!("{}-{}-{}", prefix, at.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn number_has_prefix_date_and_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let number = document_number(INVOICE_PREFIX, at);
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], "20240309");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn numbers_differ() {
        let at = Utc::now();
        assert_ne!(
            document_number(JOB_PREFIX, at),
            document_number(JOB_PREFIX, at)
        );
    }
}
