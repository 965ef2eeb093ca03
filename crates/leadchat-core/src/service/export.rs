//! CSV export of captured leads.
//!
//! The layout is fixed: a `Name,Email,Custom Answer,Date` header followed by
//! one line per lead, every data field wrapped in double quotes with inner
//! quotes doubled. Lines are separated by `\n` and there is no trailing
//! newline, so an export with no leads is exactly the header.

use chrono::NaiveDate;
use leadchat_types::config::CsvDateFormat;
use leadchat_types::lead::Lead;

/// Header row of every lead export.
pub const CSV_HEADER: &str = "Name,Email,Custom Answer,Date";

/// Render leads as CSV text. Pure: depends only on its arguments.
pub fn leads_to_csv(leads: &[Lead], date_format: CsvDateFormat) -> String {
    let mut lines = Vec::with_capacity(leads.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for lead in leads {
        let date = lead.created_at.format(date_format.pattern()).to_string();
        let fields = [
            quote(&lead.name),
            quote(&lead.email),
            quote(lead.custom_answer.as_deref().unwrap_or("")),
            quote(&date),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Suggested download name: `leads_{slug}_{YYYY-MM-DD}.csv`.
pub fn export_file_name(slug: &str, on: NaiveDate) -> String {
    format!("leads_{slug}_{}.csv", on.format("%Y-%m-%d"))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadchat_types::form::FormId;
    use uuid::Uuid;

    fn lead(name: &str, email: &str, answer: Option<&str>) -> Lead {
        Lead {
            id: Uuid::now_v7(),
            form_id: FormId::new(),
            name: name.to_string(),
            email: email.to_string(),
            custom_answer: answer.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 1, 20, 9, 15, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(leads_to_csv(&[], CsvDateFormat::DayMonthYear), CSV_HEADER);
    }

    #[test]
    fn test_rows_are_quoted_and_dated() {
        let csv = leads_to_csv(
            &[
                lead("Ana Silva", "ana.silva@email.com", Some("Marketing")),
                lead("Bob", "bob@x.com", None),
            ],
            CsvDateFormat::DayMonthYear,
        );
        let expected = "Name,Email,Custom Answer,Date\n\
                        \"Ana Silva\",\"ana.silva@email.com\",\"Marketing\",\"20/01/2024\"\n\
                        \"Bob\",\"bob@x.com\",\"\",\"20/01/2024\"";
        assert_eq!(csv, expected);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_comma_stays_in_one_field() {
        let csv = leads_to_csv(
            &[lead("Ana", "ana@x.com", Some("Sales, Marketing"))],
            CsvDateFormat::Iso,
        );
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "\"Ana\",\"ana@x.com\",\"Sales, Marketing\",\"2024-01-20\"");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = leads_to_csv(
            &[lead("Jo \"JJ\" Santos", "jo@x.com", None)],
            CsvDateFormat::MonthDayYear,
        );
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "\"Jo \"\"JJ\"\" Santos\",\"jo@x.com\",\"\",\"01/20/2024\"");
    }

    #[test]
    fn test_export_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_file_name("ebook", day), "leads_ebook_2024-03-05.csv");
    }
}
