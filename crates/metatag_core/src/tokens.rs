use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::RenderContext;

pub const LANGCODE_TOKEN: &str = "language:langcode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenOptions {
    pub clear_unresolved: bool,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token {token} failed: {message}")]
    Failed { token: String, message: String },
}

pub trait TokenSubstitutor {
    fn replace(
        &self,
        text: &str,
        ctx: &RenderContext,
        options: TokenOptions,
    ) -> Result<String, TokenError>;
}

#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    values: BTreeMap<String, String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    fn lookup<'a>(&'a self, key: &str, ctx: &'a RenderContext) -> Option<&'a str> {
        if let Some(value) = ctx.tokens.get(key) {
            return Some(value.as_str());
        }
        if key == LANGCODE_TOKEN {
            if let Some(langcode) = ctx.langcode.as_deref() {
                return Some(langcode);
            }
        }
        self.values.get(key).map(String::as_str)
    }
}

impl TokenSubstitutor for TokenTable {
    fn replace(
        &self,
        text: &str,
        ctx: &RenderContext,
        options: TokenOptions,
    ) -> Result<String, TokenError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('[') {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            match parse_token(candidate) {
                Some(token) => {
                    match self.lookup(token, ctx) {
                        Some(value) => out.push_str(value),
                        None if options.clear_unresolved => {}
                        None => out.push_str(&candidate[..token.len() + 2]),
                    }
                    rest = &candidate[token.len() + 2..];
                }
                None => {
                    out.push('[');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn parse_token(input: &str) -> Option<&str> {
    let body = input.strip_prefix('[')?;
    let end = body.find([']', '['])?;
    if body.as_bytes()[end] != b']' {
        return None;
    }
    let token = &body[..end];
    let (kind, field) = token.split_once(':')?;
    if kind.is_empty() || field.is_empty() || kind.chars().any(char::is_whitespace) {
        return None;
    }
    Some(token)
}

pub struct MetatagTokens<'a, T: TokenSubstitutor + ?Sized> {
    inner: &'a T,
}

impl<'a, T: TokenSubstitutor + ?Sized> MetatagTokens<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        Self { inner }
    }

    pub fn replace(&self, text: &str, ctx: &RenderContext) -> Result<String, TokenError> {
        let options = TokenOptions {
            clear_unresolved: true,
        };
        let replaced = self.inner.replace(text, ctx, options)?;
        Ok(collapse_slashes(&replaced))
    }
}

/// Collapses runs of `/` to one, except directly after `:` where `//` is kept.
pub fn collapse_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut run = 0usize;
    let mut run_limit = 1usize;
    for ch in value.chars() {
        if ch == '/' {
            if run == 0 {
                run_limit = if out.ends_with(':') { 2 } else { 1 };
            }
            run += 1;
            if run > run_limit {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }
    out
}
