//! Orders bundle items for a customer over a date range.

use chrono::NaiveDate;

/// An order row.
///
/// `created_date` is immutable after creation — updates coming over the wire
/// never touch it. `end_date`, when set together with `start_date`, must not
/// precede it; the order service enforces this before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: i32,
    pub created_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<i32>,
    pub logged_by_id: Option<i32>,
    pub deleted: bool,
}

impl Order {
    /// True when the pair of dates is orderable: both set and end before
    /// start is the one rejected combination.
    pub fn dates_valid(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        match (start, end) {
            (Some(s), Some(e)) => e >= s,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn dates_valid_accepts_open_ranges() {
        assert!(Order::dates_valid(None, None));
        assert!(Order::dates_valid(Some(d("2026-01-01")), None));
        assert!(Order::dates_valid(None, Some(d("2026-01-01"))));
    }

    #[test]
    fn dates_valid_rejects_end_before_start() {
        assert!(!Order::dates_valid(Some(d("2026-02-01")), Some(d("2026-01-01"))));
        assert!(Order::dates_valid(Some(d("2026-01-01")), Some(d("2026-01-01"))));
    }
}
