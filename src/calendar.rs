use chrono::{Datelike, Local, Month, NaiveDate, Weekday};

/// Monday to Friday of `month` in ascending order, or `None` for an invalid year/month.
pub fn business_days_of_month(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
	let first = NaiveDate::from_ymd_opt(year, month, 1)?;
	Some(
		first
			.iter_days()
			.take_while(|day| day.month() == month)
			.filter(|day| is_business_day(*day))
			.collect(),
	)
}

pub fn is_business_day(date: NaiveDate) -> bool {
	!matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn month_name(month: u32) -> &'static str {
	u8::try_from(month)
		.ok()
		.and_then(|m| Month::try_from(m).ok())
		.map(|m| m.name())
		.unwrap_or("")
}

/// (year, month) before and after the given one.
pub fn neighbour_months(year: i32, month: u32) -> ((i32, u32), (i32, u32)) {
	let prev = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
	let next = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
	(prev, next)
}

pub fn today() -> NaiveDate {
	Local::now().date_naive()
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
