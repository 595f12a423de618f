//! Small CSS-subset selector engine for the headless DOM.
//!
//! Supports what the slider actually queries: tag names, `#id`, `.class`,
//! `[attr]`, `[attr=v]`, `[attr*=v]`, descendant combinators (whitespace) and
//! comma-separated alternatives. Anything else is a parse error, which callers
//! treat as "matches nothing".

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct SelectorParseError {
    pub selector: String,
    pub reason: &'static str,
}

/// A parsed selector: one or more alternatives, any of which may match.
#[derive(Debug, Clone)]
pub struct SelectorList {
    pub(super) alternatives: Vec<Compound>,
}

/// Whitespace-combined steps; the last step is the subject, the preceding
/// steps must match ancestors in order.
#[derive(Debug, Clone)]
pub(super) struct Compound {
    pub(super) steps: Vec<Step>,
}

#[derive(Debug, Clone, Default)]
pub(super) struct Step {
    pub(super) tag: Option<String>,
    pub(super) id: Option<String>,
    pub(super) classes: Vec<String>,
    pub(super) attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone)]
pub(super) enum AttrTest {
    Present(String),
    Equals(String, String),
    Contains(String, String),
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorParseError> {
        let err = |reason| SelectorParseError {
            selector: input.to_string(),
            reason,
        };

        let mut alternatives = Vec::new();
        for alt in input.split(',') {
            let alt = alt.trim();
            if alt.is_empty() {
                return Err(err("empty alternative"));
            }
            let mut steps = Vec::new();
            for part in alt.split_whitespace() {
                steps.push(parse_step(part).map_err(err)?);
            }
            alternatives.push(Compound { steps });
        }
        if alternatives.is_empty() {
            return Err(err("empty selector"));
        }
        Ok(Self { alternatives })
    }
}

fn parse_step(part: &str) -> Result<Step, &'static str> {
    let mut step = Step::default();
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0;

    let read_name = |chars: &[char], mut i: usize| -> (String, usize) {
        let start = i;
        while i < chars.len()
            && (chars[i].is_ascii_alphanumeric() || chars[i] == '-' || chars[i] == '_')
        {
            i += 1;
        }
        (chars[start..i].iter().collect(), i)
    };

    // Optional leading tag name or universal `*`.
    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else if i < chars.len() && chars[i].is_ascii_alphabetic() {
        let (name, next) = read_name(&chars, i);
        step.tag = Some(name.to_ascii_lowercase());
        i = next;
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err("empty id");
                }
                step.id = Some(name);
                i = next;
            }
            '.' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err("empty class");
                }
                step.classes.push(name);
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or("unclosed attribute bracket")?;
                let body: String = chars[i + 1..i + close].iter().collect();
                step.attrs.push(parse_attr_test(&body)?);
                i += close + 1;
            }
            _ => return Err("unexpected character"),
        }
    }

    if step.tag.is_none() && step.id.is_none() && step.classes.is_empty() && step.attrs.is_empty() {
        return Err("empty step");
    }
    Ok(step)
}

fn parse_attr_test(body: &str) -> Result<AttrTest, &'static str> {
    let unquote = |v: &str| -> String {
        let v = v.trim();
        let bytes = v.as_bytes();
        if bytes.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[bytes.len() - 1] == bytes[0]
        {
            v[1..v.len() - 1].to_string()
        } else {
            v.to_string()
        }
    };

    if let Some((name, value)) = body.split_once("*=") {
        let name = name.trim();
        if name.is_empty() {
            return Err("empty attribute name");
        }
        Ok(AttrTest::Contains(name.to_string(), unquote(value)))
    } else if let Some((name, value)) = body.split_once('=') {
        let name = name.trim();
        if name.is_empty() {
            return Err("empty attribute name");
        }
        Ok(AttrTest::Equals(name.to_string(), unquote(value)))
    } else {
        let name = body.trim();
        if name.is_empty() {
            return Err("empty attribute name");
        }
        Ok(AttrTest::Present(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_list_with_compounds() {
        let sel = SelectorList::parse(".comeet-positions, .comeet-widget, ul").expect("parse");
        assert_eq!(sel.alternatives.len(), 3);
        assert_eq!(sel.alternatives[2].steps[0].tag.as_deref(), Some("ul"));
    }

    #[test]
    fn parses_descendant_steps() {
        let sel = SelectorList::parse("#careers ul.positions").expect("parse");
        assert_eq!(sel.alternatives.len(), 1);
        let steps = &sel.alternatives[0].steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id.as_deref(), Some("careers"));
        assert_eq!(steps[1].classes, vec!["positions".to_string()]);
    }

    #[test]
    fn parses_attribute_tests() {
        let sel = SelectorList::parse("a[href], [data-url], [class*=\"title\"]").expect("parse");
        assert_eq!(sel.alternatives.len(), 3);
        assert!(matches!(
            sel.alternatives[2].steps[0].attrs[0],
            AttrTest::Contains(ref n, ref v) if n == "class" && v == "title"
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("div,,span").is_err());
        assert!(SelectorList::parse("[unclosed").is_err());
        assert!(SelectorList::parse(".").is_err());
        assert!(SelectorList::parse("div > span").is_err());
    }
}
