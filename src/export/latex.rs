//! HTML to LaTeX listing conversion
//!
//! Highlight copies produce inline-styled markup: a container `<div>` with
//! one `<div>` per line and `<span style="color: #rrggbb;">` runs inside.
//! `ListingConverter` turns that markup into a fancyvrb `Verbatim` block
//! with `commandchars`, so colors survive as `\textcolor[HTML]{..}{..}`.
//!
//! The generated listing needs `\usepackage{fancyvrb}` and
//! `\usepackage{xcolor}` in the preamble.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Converter Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Converts captured HTML into LaTeX.
pub trait ToLatex {
    fn convert(&self, html: &str) -> Result<String>;
}

impl<F> ToLatex for F
where
    F: Fn(&str) -> Result<String>,
{
    fn convert(&self, html: &str) -> Result<String> {
        self(html)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Markup Scanning
// ─────────────────────────────────────────────────────────────────────────────

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static STYLE_ATTR_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>|([^<]+)|(<)")
            .expect("token pattern is valid")
    })
}

fn style_attr_re() -> &'static Regex {
    STYLE_ATTR_RE.get_or_init(|| {
        Regex::new(r#"(?i)style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("style pattern is valid")
    })
}

fn entity_re() -> &'static Regex {
    ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("entity pattern is valid")
    })
}

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "meta", "link", "input", "wbr", "col"];

/// Text styling carried by an open element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RunStyle {
    color: Option<String>,
    bold: Option<bool>,
    italic: Option<bool>,
}

impl RunStyle {
    fn from_attributes(attributes: &str) -> Self {
        let mut style = RunStyle::default();
        let Some(caps) = style_attr_re().captures(attributes) else {
            return style;
        };
        let declarations = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());

        for declaration in declarations.split(';') {
            let Some((key, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim().to_ascii_lowercase();
            match key.trim().to_ascii_lowercase().as_str() {
                "color" => style.color = parse_css_color(&value),
                "font-weight" => {
                    style.bold = Some(
                        value == "bold"
                            || value == "bolder"
                            || value.parse::<u32>().is_ok_and(|w| w >= 600),
                    )
                }
                "font-style" => style.italic = Some(value == "italic" || value == "oblique"),
                _ => {}
            }
        }
        style
    }
}

/// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)` into an upper-case `RRGGBB`.
fn parse_css_color(value: &str) -> Option<String> {
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            6 => Some(hex.to_ascii_uppercase()),
            // #rrggbbaa: drop alpha
            8 => Some(hex[..6].to_ascii_uppercase()),
            3 => Some(
                hex.chars()
                    .flat_map(|c| [c, c])
                    .collect::<String>()
                    .to_ascii_uppercase(),
            ),
            _ => None,
        };
    }

    let inner = value
        .strip_prefix("rgb(")
        .or_else(|| value.strip_prefix("rgba("))?
        .strip_suffix(')')?;
    let channels: Vec<u8> = inner
        .split(',')
        .take(3)
        .map(|c| c.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match channels.as_slice() {
        [r, g, b] => Some(format!("{:02X}{:02X}{:02X}", r, g, b)),
        _ => None,
    }
}

/// Decode the HTML entities that highlight copies contain.
pub fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Escape the characters that are active under `commandchars=\\\{\}`.
fn escape_verbatim(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing Converter
// ─────────────────────────────────────────────────────────────────────────────

/// Converts highlighted HTML into a colored fancyvrb `Verbatim` listing.
#[derive(Debug, Clone, Default)]
pub struct ListingConverter;

struct OpenElement {
    name: String,
    style: RunStyle,
}

impl ListingConverter {
    pub fn new() -> Self {
        Self
    }

    /// Effective style of text at the current nesting.
    fn current_style(stack: &[OpenElement]) -> RunStyle {
        let mut effective = RunStyle::default();
        for element in stack {
            if element.style.color.is_some() {
                effective.color = element.style.color.clone();
            }
            if element.style.bold.is_some() {
                effective.bold = element.style.bold;
            }
            if element.style.italic.is_some() {
                effective.italic = element.style.italic;
            }
        }
        effective
    }

    /// Append a run of text, wrapping each line separately because
    /// `Verbatim` command arguments cannot span lines.
    fn push_run(body: &mut String, text: &str, style: &RunStyle) {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                body.push('\n');
            }
            if line.is_empty() {
                continue;
            }
            let mut run = escape_verbatim(line);
            if style.italic == Some(true) {
                run = format!("\\textit{{{}}}", run);
            }
            if style.bold == Some(true) {
                run = format!("\\textbf{{{}}}", run);
            }
            if let Some(color) = &style.color {
                run = format!("\\textcolor[HTML]{{{}}}{{{}}}", color, run);
            }
            body.push_str(&run);
        }
    }

    fn convert_markup(&self, html: &str) -> Result<String> {
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut body = String::new();

        for caps in token_re().captures_iter(html) {
            if let Some(text) = caps.get(4) {
                let text = decode_entities(text.as_str());
                Self::push_run(&mut body, &text, &Self::current_style(&stack));
                continue;
            }
            if caps.get(5).is_some() {
                // A lone `<` that does not start a tag
                Self::push_run(&mut body, "<", &Self::current_style(&stack));
                continue;
            }
            let Some(name) = caps.get(2) else {
                // Comment
                continue;
            };

            let name = name.as_str().to_ascii_lowercase();
            let closing = !caps[1].is_empty();
            let attributes = caps.get(3).map_or("", |m| m.as_str());
            let div_depth = stack.iter().filter(|e| e.name == "div").count();

            if VOID_ELEMENTS.contains(&name.as_str()) {
                // Line divs end lines themselves; `<br>` there only keeps
                // empty lines from collapsing.
                if name == "br" && !closing && div_depth < 2 {
                    body.push('\n');
                }
                continue;
            }

            if closing {
                match stack.pop() {
                    Some(open) if open.name == name => {}
                    Some(open) => {
                        return Err(Error::ConverterFailed(format!(
                            "expected </{}>, found </{}>",
                            open.name, name
                        )))
                    }
                    None => {
                        return Err(Error::ConverterFailed(format!(
                            "unexpected closing tag </{}>",
                            name
                        )))
                    }
                }
                // A nested div is one line of the listing
                if name == "div" && div_depth >= 2 {
                    body.push('\n');
                }
            } else if !attributes.trim_end().ends_with('/') {
                stack.push(OpenElement {
                    style: RunStyle::from_attributes(attributes),
                    name,
                });
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::ConverterFailed(format!("unclosed tag <{}>", open.name)));
        }
        Ok(body)
    }
}

impl ToLatex for ListingConverter {
    fn convert(&self, html: &str) -> Result<String> {
        let mut body = self.convert_markup(html)?;
        if !body.ends_with('\n') {
            body.push('\n');
        }
        Ok(format!(
            "\\begin{{Verbatim}}[commandchars=\\\\\\{{\\}}]\n{}\\end{{Verbatim}}\n",
            body
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
