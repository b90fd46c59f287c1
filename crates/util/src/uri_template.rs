//! URI template parsing and expansion (RFC 6570, levels 1-4).
//!
//! Supports every expression operator (`+ # . / ; ? &`), the explode (`*`)
//! and prefix (`:n`) modifiers, and list/map values. Variables that are
//! absent or `null`, and empty lists or maps, are undefined and omitted.

use std::fmt;

use latebind_types::{Props, TemplateError};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

/// Everything but RFC 3986 unreserved characters.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Everything but unreserved and reserved characters, used by `+` and `#`.
const UNRESERVED_OR_RESERVED: &AsciiSet = &UNRESERVED
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

const MAX_PREFIX_LENGTH: usize = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    PathSegment,
    PathParameter,
    Query,
    QueryContinuation,
}

impl Operator {
    fn from_char(character: char) -> Option<Self> {
        match character {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::PathSegment),
            ';' => Some(Self::PathParameter),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Simple => "",
            Self::Reserved => "+",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::PathSegment => "/",
            Self::PathParameter => ";",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            other => other.symbol(),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::Label => ".",
            Self::PathSegment => "/",
            Self::PathParameter => ";",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn named(self) -> bool {
        matches!(self, Self::PathParameter | Self::Query | Self::QueryContinuation)
    }

    fn if_empty(self) -> &'static str {
        match self {
            Self::Query | Self::QueryContinuation => "=",
            _ => "",
        }
    }

    fn allows_reserved(self) -> bool {
        matches!(self, Self::Reserved | Self::Fragment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VarSpec {
    name: String,
    explode: bool,
    prefix: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression { operator: Operator, variables: Vec<VarSpec> },
}

/// A parsed URI template, reusable across expansions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl UriTemplate {
    /// Parses `template`, validating every expression.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut remainder = template;
        let mut offset = 0;

        while let Some(index) = remainder.find(['{', '}']) {
            literal.push_str(&remainder[..index]);
            if remainder[index..].starts_with('}') {
                return Err(TemplateError::StrayClosingBrace {
                    template: template.to_string(),
                    offset: offset + index,
                });
            }
            let after_open = &remainder[index + 1..];
            let Some(end) = after_open.find('}') else {
                return Err(TemplateError::UnclosedExpression {
                    template: template.to_string(),
                    offset: offset + index,
                });
            };
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(parse_expression(template, &after_open[..end])?);
            let consumed = index + 1 + end + 1;
            offset += consumed;
            remainder = &remainder[consumed..];
        }
        literal.push_str(remainder);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let Part::Expression { variables, .. } = part {
                for variable in variables {
                    if !names.contains(&variable.name.as_str()) {
                        names.push(&variable.name);
                    }
                }
            }
        }
        names
    }

    /// Expands the template against `values`.
    ///
    /// # Errors
    /// Fails when a prefix modifier is applied to a list or map value.
    pub fn expand(&self, values: &Props) -> Result<String, TemplateError> {
        let mut expanded = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => expanded.push_str(text),
                Part::Expression { operator, variables } => {
                    expand_expression(&mut expanded, *operator, variables, values)?;
                }
            }
        }
        Ok(expanded)
    }
}

fn parse_expression(template: &str, body: &str) -> Result<Part, TemplateError> {
    let leading = body.chars().next();
    let (operator, specs) = match leading.and_then(Operator::from_char) {
        Some(operator) => (operator, &body[1..]),
        None => {
            if let Some(character @ ('=' | ',' | '!' | '@' | '|')) = leading {
                return Err(TemplateError::UnsupportedOperator {
                    template: template.to_string(),
                    operator: character,
                });
            }
            (Operator::Simple, body)
        }
    };

    let variables = specs
        .split(',')
        .map(|spec| parse_varspec(template, spec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Part::Expression { operator, variables })
}

fn parse_varspec(template: &str, spec: &str) -> Result<VarSpec, TemplateError> {
    let invalid = || TemplateError::InvalidVariable {
        template: template.to_string(),
        spec: spec.to_string(),
    };

    let (name, explode, prefix) = if let Some(name) = spec.strip_suffix('*') {
        (name, true, None)
    } else if let Some((name, length)) = spec.split_once(':') {
        let length: usize = length.parse().map_err(|_| invalid())?;
        if length == 0 || length > MAX_PREFIX_LENGTH {
            return Err(invalid());
        }
        (name, false, Some(length))
    } else {
        (spec, false, None)
    };

    let valid_name = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '_' | '.' | '%'));
    if !valid_name {
        return Err(invalid());
    }

    Ok(VarSpec {
        name: name.to_string(),
        explode,
        prefix,
    })
}

fn expand_expression(out: &mut String, operator: Operator, variables: &[VarSpec], values: &Props) -> Result<(), TemplateError> {
    let mut first = true;
    for variable in variables {
        let Some(segment) = expand_variable(operator, variable, values.get(&variable.name))? else {
            continue;
        };
        out.push_str(if first { operator.first() } else { operator.separator() });
        out.push_str(&segment);
        first = false;
    }
    Ok(())
}

fn expand_variable(operator: Operator, variable: &VarSpec, value: Option<&Value>) -> Result<Option<String>, TemplateError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if items.is_empty() {
                return Ok(None);
            }
            if variable.prefix.is_some() {
                return Err(TemplateError::PrefixOnComposite {
                    name: variable.name.clone(),
                });
            }
            Ok(Some(expand_list(operator, variable, &items)))
        }
        Value::Object(entries) => {
            let pairs: Vec<(String, String)> = entries
                .iter()
                .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
                .collect();
            if pairs.is_empty() {
                return Ok(None);
            }
            if variable.prefix.is_some() {
                return Err(TemplateError::PrefixOnComposite {
                    name: variable.name.clone(),
                });
            }
            Ok(Some(expand_map(operator, variable, &pairs)))
        }
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            let text = match variable.prefix {
                Some(length) => text.chars().take(length).collect(),
                None => text,
            };
            Ok(Some(expand_scalar(operator, &variable.name, &text)))
        }
    }
}

fn expand_scalar(operator: Operator, name: &str, text: &str) -> String {
    if !operator.named() {
        return encode(operator, text);
    }
    if text.is_empty() {
        return format!("{}{}", encode_name(name), operator.if_empty());
    }
    format!("{}={}", encode_name(name), encode(operator, text))
}

fn expand_list(operator: Operator, variable: &VarSpec, items: &[String]) -> String {
    if !variable.explode {
        let joined = items.iter().map(|item| encode(operator, item)).collect::<Vec<_>>().join(",");
        return if operator.named() {
            format!("{}={}", encode_name(&variable.name), joined)
        } else {
            joined
        };
    }
    items
        .iter()
        .map(|item| {
            if operator.named() {
                expand_scalar(operator, &variable.name, item)
            } else {
                encode(operator, item)
            }
        })
        .collect::<Vec<_>>()
        .join(operator.separator())
}

fn expand_map(operator: Operator, variable: &VarSpec, pairs: &[(String, String)]) -> String {
    if !variable.explode {
        let joined = pairs
            .iter()
            .map(|(key, value)| format!("{},{}", encode(operator, key), encode(operator, value)))
            .collect::<Vec<_>>()
            .join(",");
        return if operator.named() {
            format!("{}={}", encode_name(&variable.name), joined)
        } else {
            joined
        };
    }
    pairs
        .iter()
        .map(|(key, value)| {
            if operator.named() {
                expand_scalar(operator, key, value)
            } else {
                format!("{}={}", encode(operator, key), encode(operator, value))
            }
        })
        .collect::<Vec<_>>()
        .join(operator.separator())
}

/// Text form of a scalar; composites nested inside lists or maps fall back
/// to their JSON text. `null` is undefined.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn encode(operator: Operator, text: &str) -> String {
    if operator.allows_reserved() {
        encode_reserved(text)
    } else {
        utf8_percent_encode(text, UNRESERVED).to_string()
    }
}

fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, UNRESERVED_OR_RESERVED).to_string()
}

/// Reserved expansion keeps existing pct-encoded triplets intact.
fn encode_reserved(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('%') {
        encoded.extend(utf8_percent_encode(&rest[..index], UNRESERVED_OR_RESERVED));
        let candidate = &rest[index..];
        let is_triplet = candidate.len() >= 3 && candidate.as_bytes()[1..3].iter().all(u8::is_ascii_hexdigit);
        if is_triplet {
            encoded.push_str(&candidate[..3]);
            rest = &candidate[3..];
        } else {
            encoded.push_str("%25");
            rest = &candidate[1..];
        }
    }
    encoded.extend(utf8_percent_encode(rest, UNRESERVED_OR_RESERVED));
    encoded
}
