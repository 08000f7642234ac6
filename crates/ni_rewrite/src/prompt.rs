//! Prompt construction shared by every provider client.

/// Prompt for rewriting an article title.
pub fn title_prompt(title: &str, keywords: &[String]) -> String {
    format!(
        "Please rewrite the following news article title so it reads fresh \
         while keeping the original meaning and language. Work these keywords \
         in naturally where they fit: {}.\n\nTitle: {}\n\nRewritten title:",
        keywords.join(", "),
        title
    )
}

/// Prompt for rewriting an article body.
pub fn body_prompt(content: &str, keywords: &[String]) -> String {
    format!(
        "Please rewrite the following news article so it reads fresh while \
         keeping every fact, the structure, and the original language intact. \
         Work these keywords in naturally where they fit: {}.\n\nArticle:\n{}\n\nRewritten article:",
        keywords.join(", "),
        content
    )
}
