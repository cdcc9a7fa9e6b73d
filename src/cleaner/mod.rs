pub mod html;
pub mod symbol;
pub mod tags;

use crate::record::{CleanedFields, RawRecord};

/// Raw record → cleaned fields. Never drops a record; empty or unusable
/// content yields empty `cleaned_content` and the evaluator decides.
pub fn clean(record: &RawRecord) -> CleanedFields {
    let cleaned_content = html::clean_html(&record.content);
    let dream_symbol = symbol::extract_dream_symbol(&record.title);
    let tags = tags::clean_tags(&record.tags);
    let seo = tags::extract_seo(&record.properties);

    CleanedFields {
        title: record.title.trim().to_string(),
        description: record
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        url: record.url.trim().to_string(),
        dream_symbol,
        cleaned_content,
        tags,
        seo_title: seo.title,
        seo_description: seo.description,
        original_length: record.content.chars().count(),
    }
}
