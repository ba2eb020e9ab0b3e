use regex::Regex;
use std::sync::LazyLock;

/// Punctuation and whitespace removed from a lower-cased title. Runs are
/// deleted outright, never replaced by a separator.
static TITLE_DELETION_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[!@\#$%^\&*()_+\-=\[\]{};:'",.<>?/\~`|\\\s]+"#)
        .expect("title deletion pattern is a valid regex")
});

/// Derive the comparison key of a title.
///
/// A missing title yields the empty string, so every untitled record lands
/// in the same duplicate group.
///
/// ```
/// use literature_reconciler::reconcile::normalize;
///
/// assert_eq!(normalize(Some("Docs Agility!")), "docsagility");
/// assert_eq!(normalize(Some("A, B")), normalize(Some("AB")));
/// assert_eq!(normalize(None), "");
/// ```
#[must_use]
pub fn normalize(title: Option<&str>) -> String {
    title.map_or_else(String::new, |title| {
        TITLE_DELETION_SET
            .replace_all(&title.to_lowercase(), "")
            .into_owned()
    })
}
