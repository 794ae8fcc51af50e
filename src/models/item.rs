//! Transient per-topic extraction results.

/// Broad content category inferred from a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Movie,
    Series,
}

/// Everything pulled out of one topic page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    /// Cleaned display title
    pub title: String,

    /// Size in GB inferred from the title, if any
    pub size_gb: Option<f64>,

    pub kind: ContentType,

    /// Distinct magnet URIs in first-seen order
    pub magnets: Vec<String>,
}

/// Feed title for a magnet, annotated with its size when known.
pub fn annotate_title(title: &str, size_gb: Option<f64>) -> String {
    match size_gb {
        Some(size) => {
            let rounded = (size * 100.0).round() / 100.0;
            format!("{title} [{rounded}GB]")
        }
        None => title.to_string(),
    }
}
