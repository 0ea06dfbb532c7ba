//! Decides which members of an object may be accessed or invoked.

use objgraph_core::{ConfigError, ExploreConfig, Inspectable, Result};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// Member names containing one of these are never accessed, so exploration
/// cannot trigger destructive operations.
pub const RESERVED_KEYWORDS: &[&str] = &["save", "write", "remove", "delete", "duplicate"];

/// Reserved only as a whole name segment (`drop_table`, `killProcess`), since
/// as substrings they hit names like `skills` or `backdrop`.
pub const RESERVED_SEGMENTS: &[&str] = &["clear", "truncate", "drop", "shutdown", "kill"];

#[derive(Debug, Clone)]
enum DenyRule {
    AllMembers,
    Members(HashSet<String>),
}

/// Per-type member denylist for heavy or unsafe types.
#[derive(Debug, Clone, Default)]
pub struct TypeDenylist {
    rules: HashMap<String, DenyRule>,
}

impl TypeDenylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in entries. Empty: which foreign types are unsafe to touch is
    /// domain configuration.
    pub fn builtin() -> Self {
        Self::new()
    }

    pub fn from_config(config: &ExploreConfig) -> Self {
        let mut denylist = Self::builtin();
        for type_name in &config.ignored_types {
            denylist.deny_type(type_name);
        }
        for (type_name, members) in &config.ignored_members {
            denylist.deny_members(type_name, members.iter().cloned());
        }
        denylist
    }

    /// Denies every member of `type_name`.
    pub fn deny_type(&mut self, type_name: &str) {
        self.rules.insert(type_name.to_string(), DenyRule::AllMembers);
    }

    pub fn deny_members(&mut self, type_name: &str, members: impl IntoIterator<Item = String>) {
        let rule = self
            .rules
            .entry(type_name.to_string())
            .or_insert_with(|| DenyRule::Members(HashSet::new()));
        if let DenyRule::Members(set) = rule {
            set.extend(members);
        }
    }

    pub fn is_denied(&self, type_name: &str, member: &str) -> bool {
        match self.rules.get(type_name) {
            Some(DenyRule::AllMembers) => true,
            Some(DenyRule::Members(set)) => set.contains(member),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

pub struct MembershipFilter {
    ignore: Option<Regex>,
    denylist: TypeDenylist,
}

impl MembershipFilter {
    /// Builds the filter for a search for `pattern`.
    ///
    /// Fails with [`ConfigError::ExcludedPattern`] when `pattern` would itself
    /// be rejected by the merged ignore rule.
    pub fn new(pattern: &str, ignore_patterns: &[String], denylist: TypeDenylist) -> Result<Self> {
        let user = ignore_patterns
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("|");
        let ignore = if user.is_empty() {
            None
        } else {
            Some(RegexBuilder::new(&user).case_insensitive(true).build()?)
        };

        if !pattern.is_empty() {
            let user_hit = ignore.as_ref().is_some_and(|re| re.is_match(pattern));
            if user_hit || contains_reserved(pattern) {
                let mut merged = RESERVED_KEYWORDS
                    .iter()
                    .chain(RESERVED_SEGMENTS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join("|");
                if !user.is_empty() {
                    merged = format!("{}|{}", merged, user);
                }
                return Err(ConfigError::ExcludedPattern {
                    pattern: pattern.to_string(),
                    ignore: merged,
                }
                .into());
            }
        }

        Ok(Self { ignore, denylist })
    }

    pub fn from_config(pattern: &str, config: &ExploreConfig) -> Result<Self> {
        Self::new(
            pattern,
            &config.ignore_pattern,
            TypeDenylist::from_config(config),
        )
    }

    /// `true` when `member` of `owner` must not be accessed or invoked.
    pub fn should_ignore(&self, owner: &dyn Inspectable, member: &str) -> bool {
        self.ignore.as_ref().is_some_and(|re| re.is_match(member))
            || contains_reserved(member)
            || self.denylist.is_denied(owner.type_name(), member)
    }
}

fn contains_reserved(name: &str) -> bool {
    let lower = name.to_lowercase();
    RESERVED_KEYWORDS.iter().any(|kw| lower.contains(kw))
        || name_segments(name)
            .iter()
            .any(|segment| RESERVED_SEGMENTS.contains(&segment.as_str()))
}

/// Lowercase words of a member name, split on non-alphanumerics and on
/// camelCase boundaries: `dropAll_now` -> `drop`, `all`, `now`.
fn name_segments(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
