//! Blank weekly entry template.
//!
//! Rendering is pure: no storage access, no errors, same output every call.

use crate::markdown;
use crate::model::weekly_entry::WeeklyEntry;

/// Returns a blank entry: no label, empty date range, every section empty.
pub fn render() -> WeeklyEntry {
    WeeklyEntry::default()
}

/// Returns the Markdown skeleton of a blank entry, ready to copy into a log.
pub fn render_markdown() -> String {
    markdown::render_entry(&render())
}

#[cfg(test)]
mod tests {
    use super::{render, render_markdown};
    use crate::model::weekly_entry::EntrySection;

    #[test]
    fn render_returns_unlabeled_empty_entry() {
        let entry = render();
        assert!(entry.week_label.is_none());
        assert!(entry.date_range.is_empty());
        for section in EntrySection::ALL {
            assert!(entry.section(section).is_empty());
        }
    }

    #[test]
    fn render_markdown_lists_every_section_heading() {
        let skeleton = render_markdown();
        assert!(skeleton.starts_with("## Week ?\n"));
        for section in EntrySection::ALL {
            assert!(skeleton.contains(&format!("### {}\n-\n", section.heading())));
        }
    }
}
