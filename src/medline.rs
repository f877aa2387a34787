//! PubMed article XML parsing.
//!
//! Converts raw efetch XML into normalized [`Article`] records. The document
//! is deserialized with `quick_xml` into lenient optional-field structs, then
//! each record is normalized by a total function: a record without a PMID is
//! dropped, every other missing field gets its fixed placeholder, and all
//! extracted text is whitespace-squashed. A malformed record can never abort
//! the rest of the batch.

use serde::Deserialize;

use crate::article::{
    Article, FullText, NO_ABSTRACT, NO_AUTHOR, NO_AUTHORS, NO_JOURNAL, NO_TITLE, NO_YEAR,
};
use crate::error::{LitgapError, Result};

/// Remove control characters that break XML parsing (everything below 0x20
/// except tab, newline and carriage return).
pub fn strip_control_chars(xml: &str) -> String {
    xml.chars()
        .filter(|c| {
            !matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
        })
        .collect()
}

/// Parse one efetch response document into normalized articles.
///
/// A document-level parse failure is returned as an error (the caller skips
/// the chunk); records that cannot be normalized are silently dropped.
pub fn parse_article_set(xml: &str) -> Result<Vec<Article>> {
    let set: RawArticleSet = quick_xml::de::from_str(xml)
        .map_err(|e| LitgapError::Parse(format!("Invalid PubMed article XML: {}", e)))?;

    Ok(set.articles.into_iter().filter_map(normalize_record).collect())
}

/// Normalize one raw record. Returns `None` when the record has no PMID.
fn normalize_record(record: RawPubmedArticle) -> Option<Article> {
    let citation = record.medline_citation?;
    let pmid = text_of(&citation.pmid);
    if pmid.is_empty() {
        return None;
    }

    let article = citation.article;

    let title = non_empty_or(
        article.as_ref().map(|a| text_of(&a.title)).unwrap_or_default(),
        NO_TITLE,
    );

    let author_names: Vec<String> = article
        .as_ref()
        .and_then(|a| a.author_list.as_ref())
        .map(|list| list.authors.iter().filter_map(author_name).collect())
        .unwrap_or_default();
    let authors = if author_names.is_empty() {
        NO_AUTHORS.to_string()
    } else {
        author_names.join(", ")
    };
    let first_author = first_author_display(&author_names);

    let journal = non_empty_or(
        article
            .as_ref()
            .and_then(|a| a.journal.as_ref())
            .map(|j| text_of(&j.title))
            .unwrap_or_default(),
        NO_JOURNAL,
    );

    let abstract_text = non_empty_or(
        article
            .as_ref()
            .and_then(|a| a.abstract_node.as_ref())
            .map(|ab| {
                ab.fragments
                    .iter()
                    .map(|fragment| text_of_node(fragment))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default(),
        NO_ABSTRACT,
    );

    // Prefer the structured journal-issue year, fall back to an article date.
    let pub_year = article
        .as_ref()
        .and_then(|a| a.journal.as_ref())
        .and_then(|j| j.issue.as_ref())
        .and_then(|issue| issue.pub_date.as_ref())
        .map(|date| text_of(&date.year))
        .unwrap_or_default();
    let year = if pub_year.is_empty() {
        article
            .as_ref()
            .and_then(|a| {
                a.article_dates
                    .iter()
                    .map(|date| text_of(&date.year))
                    .find(|y| !y.is_empty())
            })
            .unwrap_or_default()
    } else {
        pub_year
    };
    let year = non_empty_or(year, NO_YEAR);

    let pmcid = record
        .pubmed_data
        .and_then(|data| data.article_ids)
        .and_then(|list| {
            list.ids
                .into_iter()
                .find(|id| id.id_type == "pmc")
                .and_then(|id| id.value)
        })
        .map(|value| squash_whitespace(&value))
        .unwrap_or_default();

    Some(Article {
        pmid,
        title,
        first_author,
        authors,
        year,
        journal,
        abstract_text,
        pmcid,
        full_text: FullText::NotAttempted,
    })
}

/// "ForeName LastName" for an author; authors without a LastName are not counted.
fn author_name(author: &RawAuthor) -> Option<String> {
    let last = text_of(&author.last_name);
    if last.is_empty() {
        return None;
    }
    let fore = text_of(&author.fore_name);
    Some(squash_whitespace(&format!("{} {}", fore, last)))
}

/// First author as "Lastname, F.". Single-token names pass through unchanged.
fn first_author_display(authors: &[String]) -> String {
    let Some(first) = authors.first() else {
        return NO_AUTHOR.to_string();
    };
    let parts: Vec<&str> = first.split_whitespace().collect();
    match parts.as_slice() {
        [] => NO_AUTHOR.to_string(),
        [single] => (*single).to_string(),
        [fore, .., last] => match fore.chars().next() {
            Some(initial) => format!("{}, {}.", last, initial),
            None => NO_AUTHOR.to_string(),
        },
    }
}

/// Collapse whitespace runs to single spaces and trim.
fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_of(node: &Option<TextNode>) -> String {
    node.as_ref().map(text_of_node).unwrap_or_default()
}

fn text_of_node(node: &TextNode) -> String {
    node.value
        .as_deref()
        .map(squash_whitespace)
        .unwrap_or_default()
}

fn non_empty_or(value: String, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

// === Raw efetch document shapes ===
//
// Every field is optional so that an incomplete record degrades to
// placeholders instead of failing the whole document.

#[derive(Debug, Deserialize)]
struct RawArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<RawPubmedArticle>,
}

#[derive(Debug, Deserialize)]
struct RawPubmedArticle {
    #[serde(rename = "MedlineCitation")]
    medline_citation: Option<RawMedlineCitation>,
    #[serde(rename = "PubmedData")]
    pubmed_data: Option<RawPubmedData>,
}

#[derive(Debug, Deserialize)]
struct RawMedlineCitation {
    #[serde(rename = "PMID")]
    pmid: Option<TextNode>,
    #[serde(rename = "Article")]
    article: Option<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(rename = "ArticleTitle")]
    title: Option<TextNode>,
    #[serde(rename = "Journal")]
    journal: Option<RawJournal>,
    #[serde(rename = "Abstract")]
    abstract_node: Option<RawAbstract>,
    #[serde(rename = "AuthorList")]
    author_list: Option<RawAuthorList>,
    #[serde(rename = "ArticleDate", default)]
    article_dates: Vec<RawDate>,
}

#[derive(Debug, Deserialize)]
struct RawJournal {
    #[serde(rename = "Title")]
    title: Option<TextNode>,
    #[serde(rename = "JournalIssue")]
    issue: Option<RawJournalIssue>,
}

#[derive(Debug, Deserialize)]
struct RawJournalIssue {
    #[serde(rename = "PubDate")]
    pub_date: Option<RawDate>,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    #[serde(rename = "Year")]
    year: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct RawAbstract {
    #[serde(rename = "AbstractText", default)]
    fragments: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
struct RawAuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<RawAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(rename = "LastName")]
    last_name: Option<TextNode>,
    #[serde(rename = "ForeName")]
    fore_name: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct RawPubmedData {
    #[serde(rename = "ArticleIdList")]
    article_ids: Option<RawArticleIdList>,
}

#[derive(Debug, Deserialize)]
struct RawArticleIdList {
    #[serde(rename = "ArticleId", default)]
    ids: Vec<RawArticleId>,
}

#[derive(Debug, Deserialize)]
struct RawArticleId {
    #[serde(rename = "@IdType", default)]
    id_type: String,
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// Text content of a leaf element, attributes ignored.
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">31452104</PMID>
      <Article>
        <Journal>
          <JournalIssue>
            <PubDate><Year>2019</Year></PubDate>
          </JournalIssue>
          <Title>The Lancet</Title>
        </Journal>
        <ArticleTitle>Air   pollution and
          childhood asthma</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">First fragment.</AbstractText>
          <AbstractText Label="METHODS">Second fragment.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author>
            <LastName>Smith</LastName>
            <ForeName>Alice Jane</ForeName>
          </Author>
          <Author>
            <LastName>Jones</LastName>
            <ForeName>Bob</ForeName>
          </Author>
          <Author>
            <CollectiveName>The Asthma Consortium</CollectiveName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="doi">10.1016/test</ArticleId>
        <ArticleId IdType="pmc">PMC6700000</ArticleId>
      </ArticleIdList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_full_record() {
        let articles = parse_article_set(FULL_RECORD).expect("parse");
        assert_eq!(articles.len(), 1);

        let article = &articles[0];
        assert_eq!(article.pmid, "31452104");
        assert_eq!(article.title, "Air pollution and childhood asthma");
        assert_eq!(article.authors, "Alice Jane Smith, Bob Jones");
        assert_eq!(article.first_author, "Smith, A.");
        assert_eq!(article.year, "2019");
        assert_eq!(article.journal, "The Lancet");
        assert_eq!(article.abstract_text, "First fragment. Second fragment.");
        assert_eq!(article.pmcid, "PMC6700000");
        assert_eq!(article.full_text, FullText::NotAttempted);
    }

    #[test]
    fn test_record_without_pmid_is_dropped() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <Article><ArticleTitle>No identifier here</ArticleTitle></Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        assert!(parse_article_set(xml).expect("parse").is_empty());
    }

    #[test]
    fn test_bad_record_does_not_drop_good_record() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <Article><ArticleTitle>Orphan</ArticleTitle></Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>42</PMID>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        let articles = parse_article_set(xml).expect("parse");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].pmid, "42");
    }

    #[test]
    fn test_minimal_record_gets_placeholders() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation><PMID>7</PMID></MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        let articles = parse_article_set(xml).expect("parse");
        let article = &articles[0];
        assert_eq!(article.title, NO_TITLE);
        assert_eq!(article.authors, NO_AUTHORS);
        assert_eq!(article.first_author, NO_AUTHOR);
        assert_eq!(article.year, NO_YEAR);
        assert_eq!(article.journal, NO_JOURNAL);
        assert_eq!(article.abstract_text, NO_ABSTRACT);
        assert_eq!(article.pmcid, "");
    }

    #[test]
    fn test_single_token_author_name() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>7</PMID>
      <Article>
        <AuthorList>
          <Author><LastName>Jane</LastName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        let articles = parse_article_set(xml).expect("parse");
        assert_eq!(articles[0].authors, "Jane");
        assert_eq!(articles[0].first_author, "Jane");
    }

    #[test]
    fn test_author_without_last_name_not_counted() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>7</PMID>
      <Article>
        <AuthorList>
          <Author><ForeName>OnlyFore</ForeName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        let articles = parse_article_set(xml).expect("parse");
        assert_eq!(articles[0].authors, NO_AUTHORS);
        assert_eq!(articles[0].first_author, NO_AUTHOR);
    }

    #[test]
    fn test_year_falls_back_to_article_date() {
        let xml = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>7</PMID>
      <Article>
        <ArticleDate DateType="Electronic"><Year>2021</Year></ArticleDate>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;
        let articles = parse_article_set(xml).expect("parse");
        assert_eq!(articles[0].year, "2021");
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_article_set("<PubmedArticleSet><PubmedArticle>").is_err());
    }

    #[test]
    fn test_strip_control_chars() {
        let dirty = "ab\u{0}c\u{8}d\u{b}e\u{c}f\u{e}g\u{1f}h";
        assert_eq!(strip_control_chars(dirty), "abcdefgh");
        // Tab, newline and carriage return survive.
        assert_eq!(strip_control_chars("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_first_author_display_rules() {
        assert_eq!(first_author_display(&[]), NO_AUTHOR);
        assert_eq!(first_author_display(&["Jane".to_string()]), "Jane");
        assert_eq!(
            first_author_display(&["Alice Jane Smith".to_string()]),
            "Smith, A."
        );
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  a \t b\n\nc  "), "a b c");
    }
}
