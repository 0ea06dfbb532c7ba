use objgraph_core::Result;
use regex::{Regex, RegexBuilder};

/// Case-insensitive search expression. An empty pattern matches nothing.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    regex: Option<Regex>,
}

impl SearchPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = if pattern.is_empty() {
            None
        } else {
            Some(RegexBuilder::new(pattern).case_insensitive(true).build()?)
        };
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn never() -> Self {
        Self {
            source: String::new(),
            regex: None,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }
}
