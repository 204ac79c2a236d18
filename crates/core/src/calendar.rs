use chrono::{Datelike, Days, NaiveDate};

/// Advance `date` by `months` calendar months using rollover semantics.
///
/// The year/month are advanced first; the original day-of-month is then
/// counted forward from the first of the target month. A day that does not
/// exist in the target month spills into the following month instead of
/// being clamped:
///
/// - 2023-01-31 + 1 month = 2023-03-03
/// - 2024-01-31 + 1 month = 2024-03-02
/// - 2024-03-31 + 1 month = 2024-05-01
///
/// Returns `None` only if the result falls outside chrono's date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let month_index = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = month_index.rem_euclid(12) as u32 + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    first_of_month.checked_add_days(Days::new(u64::from(date.day() - 1)))
}
