//! Filename convention: `YYYY-MM-DD_Some-title` → date + "Some title".
//!
//! Stems without a valid leading date keep their whole text as the title.
//! Every `-` in the title source becomes a space.

use chrono::NaiveDate;

use crate::types::PageIdentity;

/// Title used when the stem yields a blank title.
pub const UNTITLED: &str = "Untitled";

const DATE_LEN: usize = "YYYY-MM-DD".len();

/// Derive a [`PageIdentity`] from a filename stem. Never fails.
pub fn parse(stem: &str) -> PageIdentity {
    let (date, source) = match split_date_prefix(stem) {
        Some((date, rest)) => (Some(date), rest),
        None => (None, stem),
    };
    let title = source.replace('-', " ");
    let title = if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };
    PageIdentity { title, date }
}

/// Match a leading `YYYY-MM-DD_` followed by at least one character.
fn split_date_prefix(stem: &str) -> Option<(NaiveDate, &str)> {
    let prefix = stem.get(..DATE_LEN)?;
    let rest = stem.get(DATE_LEN..)?.strip_prefix('_')?;
    if rest.is_empty() || !has_date_shape(prefix) {
        return None;
    }
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some((date, rest))
}

/// `\d{4}-\d{2}-\d{2}`: chrono alone would also accept `2024-2-7`.
fn has_date_shape(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[rstest]
    #[case("2024-02-27_Dotfiles-stuff", "Dotfiles stuff", ymd(2024, 2, 27))]
    #[case("2024-02-27_dotfiles", "dotfiles", ymd(2024, 2, 27))]
    #[case("1999-12-31_a-b-c", "a b c", ymd(1999, 12, 31))]
    #[case("2024-02-27_under_score", "under_score", ymd(2024, 2, 27))]
    #[case("2024-02-27_2024-03-01_x", "2024 03 01_x", ymd(2024, 2, 27))]
    fn dated_stems(#[case] stem: &str, #[case] title: &str, #[case] date: Option<NaiveDate>) {
        let id = parse(stem);
        assert_eq!(id.title, title);
        assert_eq!(id.date, date);
    }

    #[rstest]
    #[case("Dotfiles-stuff", "Dotfiles stuff")]
    #[case("plain", "plain")]
    #[case("2024-02-27", "2024 02 27")]
    #[case("2024-02-27_", "2024 02 27_")]
    #[case("2024-13-45_bad-date", "2024 13 45_bad date")]
    #[case("24-02-27_short", "24 02 27_short")]
    #[case("2024-2-7_loose", "2024 2 7_loose")]
    #[case("notes 2024-02-27_x", "notes 2024 02 27_x")]
    fn undated_stems(#[case] stem: &str, #[case] title: &str) {
        let id = parse(stem);
        assert_eq!(id.title, title);
        assert!(id.date.is_none());
    }

    #[test]
    fn empty_stem_gets_placeholder_title() {
        let id = parse("");
        assert_eq!(id.title, UNTITLED);
        assert!(id.date.is_none());
    }

    #[rstest]
    #[case("-", None)]
    #[case("---", None)]
    #[case("2024-02-27_--", ymd(2024, 2, 27))]
    #[case("2024-02-27_ ", ymd(2024, 2, 27))]
    fn blank_titles_get_placeholder(#[case] stem: &str, #[case] date: Option<NaiveDate>) {
        let id = parse(stem);
        assert_eq!(id.title, UNTITLED);
        assert_eq!(id.date, date);
    }

    #[test]
    fn multibyte_stems_do_not_panic() {
        let id = parse("日本語のノート");
        assert_eq!(id.title, "日本語のノート");
        let id = parse("2024-02-27_café-notes");
        assert_eq!(id.title, "café notes");
    }
}
