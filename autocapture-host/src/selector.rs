//! A small CSS selector subset used for safelist matching.
//!
//! Supported: type (`button`), universal (`*`), id (`#pay`), class
//! (`.secret`), attribute presence/equality (`[data-private]`,
//! `[type="password"]`), descendant combinators (`form .card`) and
//! comma-separated lists.

use crate::{Element, HostError, HostResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != id {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| element.classes().any(|c| c == class))
        {
            return false;
        }
        self.attrs.iter().all(|attr| match (&attr.value, element.attribute(&attr.name)) {
            (None, found) => found.is_some(),
            (Some(expected), Some(found)) => expected == found,
            (Some(_), None) => false,
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    /// Each alternative is a descendant chain, outermost first.
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(source: &str) -> HostResult<Self> {
        let invalid = |reason: &str| HostError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for alternative in split_outside_brackets(source, |c| c == ',') {
            let chain = split_outside_brackets(alternative, char::is_whitespace)
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(|part| parse_compound(part).map_err(|reason| invalid(&reason)))
                .collect::<HostResult<Vec<_>>>()?;
            if chain.is_empty() {
                return Err(invalid("empty selector"));
            }
            alternatives.push(chain);
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests `element` against the selector. `ancestors` lists the element's
    /// ancestors, nearest first.
    #[must_use]
    pub fn matches(&self, element: &Element, ancestors: &[Element]) -> bool {
        self.alternatives
            .iter()
            .any(|chain| chain_matches(chain, element, ancestors))
    }
}

fn chain_matches(chain: &[Compound], element: &Element, ancestors: &[Element]) -> bool {
    let Some((subject, rest)) = chain.split_last() else {
        return false;
    };
    if !subject.matches(element) {
        return false;
    }
    let mut remaining = ancestors.iter();
    rest.iter()
        .rev()
        .all(|compound| remaining.any(|ancestor| compound.matches(ancestor)))
}

/// Advances the quote state over `c`. Returns true while `c` is quoted
/// text or a quote delimiter.
fn step_quote(quote: &mut Option<char>, c: char) -> bool {
    match *quote {
        Some(q) => {
            if c == q {
                *quote = None;
            }
            true
        }
        None if c == '"' || c == '\'' => {
            *quote = Some(c);
            true
        }
        None => false,
    }
}

fn split_outside_brackets(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if depth > 0 && step_quote(&mut quote, c) {
            continue;
        }
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(input[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

/// Offset of the `]` closing an attribute body, skipping quoted text.
fn closing_bracket(body: &[char]) -> Option<usize> {
    let mut quote = None;
    body.iter()
        .position(|&c| !step_quote(&mut quote, c) && c == ']')
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> Result<String, String> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    if start == *pos {
        return Err(format!("expected identifier at offset {start}"));
    }
    Ok(chars[start..*pos].iter().collect())
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(take_ident(&chars, &mut pos)?);
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                let close = closing_bracket(&chars[pos..])
                    .ok_or_else(|| "unterminated attribute selector".to_string())?;
                let body: String = chars[pos..pos + close].iter().collect();
                pos += close + 1;
                compound.attrs.push(parse_attr(&body)?);
            }
            other => return Err(format!("unexpected '{other}'")),
        }
    }

    Ok(compound)
}

fn parse_attr(body: &str) -> Result<AttrMatch, String> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(unquoted.to_string()))
        }
        None => (body.trim(), None),
    };
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("invalid attribute name '{name}'"));
    }
    Ok(AttrMatch {
        name: name.to_string(),
        value,
    })
}
