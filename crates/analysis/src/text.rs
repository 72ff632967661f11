//! Tokenization and term ranking for keyword and author fields

use crate::result::TermCount;
use journalscope_common::errors::{AppError, Result};
use regex_lite::Regex;
use std::collections::HashMap;

/// Delimiters seen in keyword fields
pub const KEYWORD_DELIMITERS: &[char] = &[';', ',', '|', '、', '；', '，'];

/// Delimiters seen in author fields
pub const AUTHOR_DELIMITERS: &[char] = &[';', ',', '、', '；', '，'];

/// Splits a delimited field into normalized tokens.
///
/// Tokens are trimmed, internal whitespace runs collapse to one space, and
/// text is lowercased. Empty tokens are dropped.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiters: Regex,
    whitespace: Regex,
}

impl Tokenizer {
    pub fn new(delimiters: &[char]) -> Result<Self> {
        if delimiters.is_empty() {
            return Err(AppError::Configuration {
                message: "tokenizer needs at least one delimiter".to_string(),
            });
        }

        let class: String = delimiters
            .iter()
            .map(|c| regex_lite::escape(&c.to_string()))
            .collect();

        let delimiters = Regex::new(&format!("[{}]", class)).map_err(|e| AppError::Configuration {
            message: format!("invalid delimiter set: {}", e),
        })?;
        let whitespace = Regex::new(r"\s+").map_err(|e| AppError::Configuration {
            message: format!("invalid whitespace pattern: {}", e),
        })?;

        Ok(Self {
            delimiters,
            whitespace,
        })
    }

    pub fn keywords() -> Result<Self> {
        Self::new(KEYWORD_DELIMITERS)
    }

    pub fn authors() -> Result<Self> {
        Self::new(AUTHOR_DELIMITERS)
    }

    pub fn tokens<'a>(&'a self, field: &'a str) -> impl Iterator<Item = String> + 'a {
        self.delimiters.split(field).filter_map(move |raw| {
            let token = self.whitespace.replace_all(raw.trim(), " ").to_lowercase();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        })
    }
}

/// Top `n` terms by count descending, ties broken by term ascending
pub fn top_terms(counts: &HashMap<String, u64>, n: usize) -> Vec<TermCount> {
    let mut ranked: Vec<TermCount> = counts
        .iter()
        .map(|(term, &count)| TermCount {
            term: term.clone(),
            count,
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_tokens_are_normalized() {
        let tokenizer = Tokenizer::keywords().unwrap();
        let tokens: Vec<String> = tokenizer
            .tokens("  Deep   Learning; NLP |、 graph\tneural  networks;;")
            .collect();
        assert_eq!(tokens, vec!["deep learning", "nlp", "graph neural networks"]);
    }

    #[test]
    fn test_fullwidth_delimiters() {
        let tokenizer = Tokenizer::keywords().unwrap();
        let tokens: Vec<String> = tokenizer.tokens("机器学习；数据挖掘，知识图谱").collect();
        assert_eq!(tokens, vec!["机器学习", "数据挖掘", "知识图谱"]);
    }

    #[test]
    fn test_author_tokenizer_keeps_pipes() {
        let tokenizer = Tokenizer::authors().unwrap();
        let tokens: Vec<String> = tokenizer.tokens("Li Wei, A|B").collect();
        assert_eq!(tokens, vec!["li wei", "a|b"]);
    }

    #[test]
    fn test_empty_delimiters_rejected() {
        assert!(Tokenizer::new(&[]).is_err());
    }

    #[test]
    fn test_top_terms_tie_break() {
        let counts: HashMap<String, u64> = [("nlp", 1), ("ml", 2), ("ai", 2), ("cv", 1)]
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();

        let top = top_terms(&counts, 3);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["ai", "ml", "cv"]);
    }
}
