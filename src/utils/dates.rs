use chrono::{NaiveDate, NaiveDateTime};

/// Date-time layouts the feed has been seen to use, day-first variants before ISO.
const DATE_TIME_FORMATS: &[&str] = &[
	"%d.%m.%Y %H:%M:%S",
	"%d.%m.%Y %H:%M",
	"%d/%m/%Y %H:%M:%S",
	"%d/%m/%Y %H:%M",
	"%d-%m-%Y %H:%M:%S",
	"%d-%m-%Y %H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

fn parse_date_only(input: &str) -> Option<NaiveDate> {
	DATE_FORMATS
		.iter()
		.find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}

/// Parse a date-time, reading ambiguous numeric dates as day-first.
///
/// A bare date is accepted and treated as midnight.
pub fn parse_day_first_datetime(input: &str) -> Option<NaiveDateTime> {
	let input = input.trim();
	DATE_TIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
		.or_else(|| parse_date_only(input).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

/// Parse a date, reading ambiguous numeric dates as day-first.
///
/// A full date-time is accepted and truncated to its date.
pub fn parse_day_first_date(input: &str) -> Option<NaiveDate> {
	let input = input.trim();
	parse_date_only(input).or_else(|| {
		DATE_TIME_FORMATS
			.iter()
			.find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
			.map(|dt| dt.date())
	})
}
