//! Signature date fields

use chrono::{Datelike, Local, NaiveDate};

use crate::value::Context;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Portuguese month name, lowercase. `month` is 1-based.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTHS.get(index).copied()
}

/// Today in the host's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Write `DIA`, `MES_EXTENSO` and `ANO` for `date`
pub fn apply_date_fields(ctx: Context, date: NaiveDate) -> Context {
    ctx.with("DIA", date.day().to_string())
        .with("MES_EXTENSO", month_name(date.month()).unwrap_or_default())
        .with("ANO", date.year().to_string())
}
