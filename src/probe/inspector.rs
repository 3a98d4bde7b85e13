//! Page inspector for extracting a title and a coarse page type
//!
//! This module handles parsing HTML content to extract:
//! - The page title (`<title>`, then `og:title`, then the first `<h1>`)
//! - A page type, decided by the first matching classification rule

use crate::config::{InspectConfig, RuleTarget};
use crate::probe::result::{PageInfo, UNKNOWN_PAGE_TYPE};
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};

/// Built-in classification rules, evaluated in this order
///
/// Each entry is (page type, target, case-insensitive pattern).
const DEFAULT_RULES: &[(&str, RuleTarget, &str)] = &[
    (
        "default server page",
        RuleTarget::Body,
        r"welcome to nginx|apache2 (ubuntu|debian) default page|test page for the apache|iis windows server|<h1>it works!</h1>",
    ),
    ("directory listing", RuleTarget::Title, r"^index of /"),
    (
        "error page",
        RuleTarget::Title,
        r"\b(400|401|403|404|500|502|503)\b|not found|forbidden|bad gateway|service unavailable|错误",
    ),
    (
        "parked domain",
        RuleTarget::Body,
        r"domain (is )?for sale|buy this domain|parked free|this domain is parked",
    ),
    ("login page", RuleTarget::Body, r#"<input[^>]+type=["']?password"#),
    ("login page", RuleTarget::Title, r"log ?in|sign ?in|登录|登陆"),
    (
        "admin panel",
        RuleTarget::Title,
        r"admin|dashboard|console|管理|后台",
    ),
    ("wordpress", RuleTarget::Body, r"/wp-content/|/wp-includes/"),
    ("api endpoint", RuleTarget::Body, r"\A\s*[\{\[]"),
];

/// A compiled classification rule
#[derive(Debug, Clone)]
pub struct PageRule {
    page_type: String,
    target: RuleTarget,
    pattern: Regex,
}

impl PageRule {
    /// Compiles a rule; the pattern is matched case-insensitively
    pub fn new(page_type: &str, target: RuleTarget, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            page_type: page_type.to_string(),
            target,
            pattern,
        })
    }

    /// The page type reported when this rule matches
    pub fn page_type(&self) -> &str {
        &self.page_type
    }

    fn matches(&self, body: &str, title: &str) -> bool {
        match self.target {
            RuleTarget::Body => self.pattern.is_match(body),
            RuleTarget::Title => self.pattern.is_match(title),
        }
    }
}

/// Classifies page content with an ordered rule list
///
/// Inspection is pure: the same body always produces the same [`PageInfo`].
#[derive(Debug, Clone)]
pub struct PageInspector {
    rules: Vec<PageRule>,
}

impl PageInspector {
    /// Creates an inspector with an explicit rule list
    pub fn new(rules: Vec<PageRule>) -> Self {
        Self { rules }
    }

    /// Creates an inspector with the built-in rules only
    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Builds the inspector described by the configuration
    ///
    /// Configured rules come first, followed by the built-in rules unless
    /// `default-rules = false`.
    pub fn from_config(config: &InspectConfig) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(config.rules.len() + DEFAULT_RULES.len());

        for rule in &config.rules {
            let compiled = PageRule::new(&rule.page_type, rule.target, &rule.pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", rule.pattern, e)))?;
            rules.push(compiled);
        }

        if config.default_rules {
            rules.extend(default_rules());
        }

        Ok(Self::new(rules))
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[PageRule] {
        &self.rules
    }

    /// Extracts the title and page type from a response body
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// classification by markup still proceeds on mis-encoded pages.
    ///
    /// # Example
    ///
    /// ```
    /// use subprobe::probe::PageInspector;
    ///
    /// let inspector = PageInspector::with_default_rules();
    /// let info = inspector.inspect(b"<html><head><title>Admin Login</title></head></html>");
    /// assert_eq!(info.title, "Admin Login");
    /// assert_eq!(info.page_type, "login page");
    /// ```
    pub fn inspect(&self, body: &[u8]) -> PageInfo {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);
        let title = extract_title(&document).unwrap_or_default();
        let page_type = self.classify(&html, &title).to_string();

        PageInfo { page_type, title }
    }

    /// Returns the page type of the first matching rule
    pub fn classify(&self, body: &str, title: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(body, title))
            .map(|rule| rule.page_type())
            .unwrap_or(UNKNOWN_PAGE_TYPE)
    }
}

impl Default for PageInspector {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

fn default_rules() -> Vec<PageRule> {
    DEFAULT_RULES
        .iter()
        .filter_map(|(page_type, target, pattern)| PageRule::new(page_type, *target, pattern).ok())
        .collect()
}

/// Extracts the first non-empty title-like element
fn extract_title(document: &Html) -> Option<String> {
    select_text(document, "title")
        .or_else(|| select_attr(document, r#"meta[property="og:title"]"#, "content"))
        .or_else(|| select_text(document, "h1"))
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|s| !s.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
