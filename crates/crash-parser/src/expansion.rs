//! Word expansion for CRASH command lines
//!
//! Stands in for the host's `wordexp`: the line is split into blank-separated
//! words, each word gets tilde, parameter and pathname expansion, and the
//! resulting fields are joined back with single spaces.

use std::collections::HashMap;

/// Read-only view of the variables expansion may consult
pub trait Env {
    fn var(&self, name: &str) -> Option<String>;
}

/// The host process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Env for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Parameter expansion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionMode {
    /// $var or ${var}
    Normal,
    /// ${var:-default}
    DefaultValue,
    /// ${var:+value}
    AlternativeValue,
}

/// Parameter expansion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRequest {
    pub variable_name: String,
    pub mode: ExpansionMode,
    pub parameter: Option<String>,
}

impl ExpansionRequest {
    #[must_use]
    pub fn simple(variable_name: String) -> Self {
        Self {
            variable_name,
            mode: ExpansionMode::Normal,
            parameter: None,
        }
    }

    /// Resolve against `env`. Unset variables expand to the empty string.
    #[must_use]
    pub fn resolve(&self, env: &dyn Env) -> String {
        let value = env.var(&self.variable_name).filter(|v| !v.is_empty());
        match self.mode {
            ExpansionMode::Normal => value.unwrap_or_default(),
            ExpansionMode::DefaultValue => {
                value.unwrap_or_else(|| self.parameter.clone().unwrap_or_default())
            }
            ExpansionMode::AlternativeValue => match value {
                Some(_) => self.parameter.clone().unwrap_or_default(),
                None => String::new(),
            },
        }
    }
}

/// Check if a string is a valid variable name
fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parse the inside of `${...}`
///
/// Returns None for forms this shell does not expand
#[must_use]
pub fn parse_braced(inner: &str) -> Option<ExpansionRequest> {
    let Some(colon_pos) = inner.find(':') else {
        return is_valid_variable_name(inner).then(|| ExpansionRequest::simple(inner.to_string()));
    };

    let var_name = &inner[..colon_pos];
    let rest = &inner[colon_pos + 1..];
    if !is_valid_variable_name(var_name) {
        return None;
    }

    let mode = match rest.chars().next() {
        Some('-') => ExpansionMode::DefaultValue,
        Some('+') => ExpansionMode::AlternativeValue,
        _ => return None,
    };

    Some(ExpansionRequest {
        variable_name: var_name.to_string(),
        mode,
        parameter: Some(rest[1..].to_string()),
    })
}

/// Tilde and parameter expansion of a single word
#[must_use]
pub fn expand_parameters(word: &str, env: &dyn Env) -> String {
    let mut out = String::with_capacity(word.len());
    let mut rest = word;

    if rest == "~" || rest.starts_with("~/") {
        if let Some(home) = env.var("HOME") {
            out.push_str(&home);
            rest = &rest[1..];
        }
    }

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(close) = braced.find('}') {
                if let Some(request) = parse_braced(&braced[..close]) {
                    out.push_str(&request.resolve(env));
                    rest = &braced[close + 1..];
                    continue;
                }
            }
        } else {
            let name_len = after
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .count();
            if name_len > 0 && is_valid_variable_name(&after[..name_len]) {
                out.push_str(&ExpansionRequest::simple(after[..name_len].to_string()).resolve(env));
                rest = &after[name_len..];
                continue;
            }
        }

        // Not an expansion we understand, keep the dollar literally
        out.push('$');
        rest = after;
    }
    out.push_str(rest);
    out
}

fn has_glob_meta(word: &str) -> bool {
    word.contains(['*', '?', '['])
}

/// Pathname expansion. A pattern that matches nothing is kept as is.
#[must_use]
pub fn expand_glob(word: &str) -> Vec<String> {
    if !has_glob_meta(word) {
        return vec![word.to_string()];
    }

    let Ok(paths) = glob::glob(word) else {
        return vec![word.to_string()];
    };

    let mut matches: Vec<String> = paths
        .filter_map(Result::ok)
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    if matches.is_empty() {
        return vec![word.to_string()];
    }
    matches.sort();
    matches
}

/// Expand a whole command line
#[must_use]
pub fn expand(line: &str, env: &dyn Env) -> String {
    line.split(' ')
        .filter(|word| !word.is_empty())
        .flat_map(|word| expand_glob(&expand_parameters(word, env)))
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
