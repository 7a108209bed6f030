//! Notification body rendering

use chrono::{Local, TimeZone};
use lookout_core::domain::item::Item;
use std::fmt::Display;

const LONG_DATE: &str = "%A, %B %-d, %Y";
const LONG_TIME: &str = "%-I:%M:%S %p";

/// Renders items in the host's local time zone
pub fn render_items(items: &[Item]) -> String {
    render_items_in(items, &Local)
}

/// Renders items as plain-text blocks, in the order given
///
/// Each block is the creation time, the body, and the space-joined URLs, with
/// a blank line after it. No items renders as an empty string.
fn render_items_in<Tz>(items: &[Item], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    items.iter().map(|item| render_item(item, tz)).collect()
}

fn render_item<Tz>(item: &Item, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let created = item.created_at.with_timezone(tz);
    format!(
        "{}  {}\n{}\n{}\n\n",
        created.format(LONG_DATE),
        created.format(LONG_TIME),
        item.body,
        item.urls.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn item(id: u64, body: &str, urls: &[&str]) -> Item {
        Item {
            id,
            created_at: Utc.with_ymd_and_hms(2018, 4, 4, 15, 4, 5).unwrap(),
            body: body.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_renders_empty() {
        assert_eq!(render_items_in(&[], &Utc), "");
        assert_eq!(render_items(&[]), "");
    }

    #[test]
    fn test_single_block_layout() {
        let rendered = render_items_in(
            &[item(1, "Hello world", &["https://a.example", "https://b.example"])],
            &Utc,
        );
        assert_eq!(
            rendered,
            "Wednesday, April 4, 2018  3:04:05 PM\nHello world\nhttps://a.example https://b.example\n\n"
        );
    }

    #[test]
    fn test_no_urls_leaves_empty_line() {
        let rendered = render_items_in(&[item(1, "plain", &[])], &Utc);
        assert_eq!(rendered, "Wednesday, April 4, 2018  3:04:05 PM\nplain\n\n\n");
    }

    #[test]
    fn test_time_zone_applied() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let rendered = render_items_in(&[item(1, "late", &[])], &tokyo);
        assert!(rendered.starts_with("Thursday, April 5, 2018  12:04:05 AM\n"));
    }

    #[test]
    fn test_blocks_keep_input_order() {
        let rendered = render_items_in(&[item(1, "first", &[]), item(2, "second", &[])], &Utc);
        let first = rendered.find("first").unwrap();
        let second = rendered.find("second").unwrap();
        assert!(first < second);
        assert_eq!(rendered.matches("2018  ").count(), 2);
    }
}
