use nr_core::Report;

/// Human-readable rendering of a report: header, then Summary, Key Takeaways,
/// Organizations and Terms and Articles, in that order.
pub fn render_markdown(report: &Report) -> String {
    let mut lines = Vec::new();
    lines.push(format!("# Topic: {}", report.topic));
    lines.push(String::new());
    lines.push(format!("Generated at: {}", report.generated_at.to_rfc3339()));
    lines.push(format!("Articles: {}", report.article_count));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(report.summary.clone());
    lines.push(String::new());

    lines.push("## Key Takeaways".to_string());
    lines.push(String::new());
    lines.extend(report.key_takeaways.iter().map(|item| format!("- {}", item)));
    lines.push(String::new());

    lines.push("## Organizations and Terms".to_string());
    lines.push(String::new());
    lines.extend(report.organizations_and_terms.iter().map(|item| format!("- {}", item)));
    lines.push(String::new());

    lines.push("## Articles".to_string());
    lines.push(String::new());
    lines.extend(report.articles.iter().map(|a| format!("- {} — {}", a.title, a.url)));
    lines.push(String::new());

    lines.join("\n")
}
