//! Prompt assembly for multi-article research-gap synthesis.
//!
//! Each article contributes an indexed block of its best-available text,
//! truncated per article and again for the prompt as a whole so the request
//! stays inside the upstream model's context.

use crate::article::Article;

/// Instruction header for the synthesis prompt
pub const ANALYSIS_HEADER: &str = "You are a research assistant. Synthesize research gaps from the provided articles into a concise list. For each gap, cite the source in parentheses (First Author, Year).\n\nExample:\n- The efficacy of treatment Y has not been tested in pediatric populations (Jones, 2021).\n\n--- START OF ARTICLES ---\n";

/// Per-article character budget
pub const ARTICLE_CHAR_LIMIT: usize = 3000;

/// Budget for the assembled prompt
pub const PROMPT_CHAR_LIMIT: usize = 30_000;

/// Build the gap-analysis prompt over a list of articles.
///
/// Uses scraped full text when the scrape produced non-empty text, otherwise
/// the abstract. Truncation is per character, boundary safe.
pub fn build_analysis_prompt(articles: &[Article]) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(idx, article)| {
            format!(
                "ARTICLE {} {}:\n{}...\n",
                idx + 1,
                article.citation(),
                truncate_chars(article.best_text(), ARTICLE_CHAR_LIMIT)
            )
        })
        .collect();

    let prompt = format!("{}{}", ANALYSIS_HEADER, blocks.join("\n"));
    truncate_chars(&prompt, PROMPT_CHAR_LIMIT)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::FullText;

    fn article(idx: usize, abstract_text: &str, full_text: FullText) -> Article {
        Article {
            pmid: idx.to_string(),
            title: format!("Title {}", idx),
            first_author: "Jones, A.".to_string(),
            authors: "Alice Jones".to_string(),
            year: "2021".to_string(),
            journal: "N/A".to_string(),
            abstract_text: abstract_text.to_string(),
            pmcid: String::new(),
            full_text,
        }
    }

    #[test]
    fn test_prompt_contains_header_and_citations() {
        let articles = vec![article(1, "Short abstract.", FullText::NotAttempted)];
        let prompt = build_analysis_prompt(&articles);
        assert!(prompt.starts_with(ANALYSIS_HEADER));
        assert!(prompt.contains("ARTICLE 1 (Jones, A., 2021):"));
        assert!(prompt.contains("Short abstract."));
    }

    #[test]
    fn test_full_text_preferred_over_abstract() {
        let articles = vec![article(
            1,
            "The abstract.",
            FullText::Text("The scraped body.".to_string()),
        )];
        let prompt = build_analysis_prompt(&articles);
        assert!(prompt.contains("The scraped body."));
        assert!(!prompt.contains("The abstract."));
    }

    #[test]
    fn test_failed_scrape_falls_back_to_abstract() {
        let articles = vec![article(
            1,
            "The abstract.",
            FullText::Failed("connection refused".to_string()),
        )];
        let prompt = build_analysis_prompt(&articles);
        assert!(prompt.contains("The abstract."));
        assert!(!prompt.contains("connection refused"));
    }

    #[test]
    fn test_article_block_is_truncated() {
        let long_abstract = "x".repeat(ARTICLE_CHAR_LIMIT * 2);
        let articles = vec![article(1, &long_abstract, FullText::NotAttempted)];
        let prompt = build_analysis_prompt(&articles);
        let body_len = prompt.chars().filter(|c| *c == 'x').count();
        assert_eq!(body_len, ARTICLE_CHAR_LIMIT);
    }

    #[test]
    fn test_prompt_capped_at_overall_limit() {
        let near_limit = "y".repeat(ARTICLE_CHAR_LIMIT - 10);
        let articles: Vec<Article> = (0..15)
            .map(|idx| article(idx, &near_limit, FullText::NotAttempted))
            .collect();
        let prompt = build_analysis_prompt(&articles);
        assert!(prompt.chars().count() <= PROMPT_CHAR_LIMIT);
    }

    #[test]
    fn test_truncate_chars_is_boundary_safe() {
        // Multi-byte characters must not be split.
        let text = "日本語のテキスト";
        assert_eq!(truncate_chars(text, 3), "日本語");
    }
}
