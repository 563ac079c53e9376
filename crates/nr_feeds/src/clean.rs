use scraper::Html;

/// Strip markup from an HTML fragment: text nodes are trimmed, empty ones
/// dropped, and the rest joined with single spaces.
pub fn clean_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_paragraph() {
        assert_eq!(clean_html("<p>New rules apply.</p>"), "New rules apply.");
    }

    #[test]
    fn test_clean_nested_markup() {
        let html = r#"<div><p>First <b>bold</b> part</p>
            <p>Second <a href="https://example.com">link</a></p></div>"#;
        assert_eq!(clean_html(html), "First bold part Second link");
    }

    #[test]
    fn test_clean_plain_text_and_entities() {
        assert_eq!(clean_html("  just text  "), "just text");
        assert_eq!(clean_html("Fish &amp; chips"), "Fish & chips");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_clean_output_has_no_tags() {
        let cleaned = clean_html("<ul><li>a</li><li>b</li></ul><img src=\"x.png\"/>");
        assert!(!cleaned.contains('<'));
        assert_eq!(cleaned, "a b");
    }
}
