//! Prompt template for turning a research idea into a PubMed boolean query.

/// Query-construction prompt.
/// Placeholder: {idea}
pub const QUERY_PROMPT_TEMPLATE: &str = r#"Based on the user's research idea, create a concise and effective PubMed query. Instructions: 1. Identify key concepts. 2. Find synonyms. 3. Group with `OR` in parentheses, like `(concept[TIAB] OR synonym[TIAB])`. 4. Combine concepts with `AND`. 5. Confine search to title/abstract with `[TIAB]`. 6. Return ONLY the final query string. User's Idea: "{idea}" Example Output: (("air pollution"[TIAB]) AND ("asthma"[TIAB]) AND ("child"[TIAB]))"#;

/// Build the query-construction prompt, embedding the idea verbatim.
pub fn build_query_prompt(idea: &str) -> String {
    QUERY_PROMPT_TEMPLATE.replace("{idea}", idea)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_prompt() {
        let prompt = build_query_prompt("microplastics in drinking water");
        assert!(prompt.contains("\"microplastics in drinking water\""));
        assert!(prompt.contains("[TIAB]"));
        assert!(!prompt.contains("{idea}"));
    }
}
