// Jetpack
// Copyright (C) Riff Labs Limited <team@riff.cc>
// Based on Jetporch by Michael DeHaan <michael@michaeldehaan.net> + contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// long with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Expression evaluation for composed variables and groups.
//!
//! Expressions are evaluated against a flat variable map (a machine record, possibly
//! combined with the host's current variables). Four shapes are understood:
//!
//! * a bare variable path such as `Address` or `Params.rack`, resolved directly so the
//!   value keeps its JSON type
//! * a quoted literal (`'lab'`), `true`/`false`/`null` or a number
//! * a handlebars template, anything containing `{{`
//! * a helper call such as `eq Stage "discover"`, rendered as `{{ ... }}` with the
//!   handlebars built-in helpers
//!
//! In strict mode a reference to an undefined variable is an error; otherwise an
//! undefined path evaluates to nothing and handlebars renders it empty.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").expect("path regex")
});

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TemplateMode {
    Strict,
    Lenient,
}

impl TemplateMode {
    pub fn from_strict(strict: bool) -> Self {
        match strict {
            true => TemplateMode::Strict,
            false => TemplateMode::Lenient,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Expression<'a> {
    Path(Vec<&'a str>),
    Literal(Value),
    Template(&'a str),
    Helper(&'a str),
}

impl<'a> Expression<'a> {
    pub fn parse(expr: &'a str) -> Self {
        let expr = expr.trim();
        if let Some(literal) = parse_literal(expr) {
            return Expression::Literal(literal);
        }
        if expr.contains("{{") {
            return Expression::Template(expr);
        }
        if PATH_RE.is_match(expr) {
            return Expression::Path(expr.split('.').collect());
        }
        Expression::Helper(expr)
    }
}

fn parse_literal(expr: &str) -> Option<Value> {
    let bytes = expr.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            let inner = &expr[1..expr.len() - 1];
            if !inner.contains(first as char) {
                return Some(Value::String(inner.to_string()));
            }
        }
    }
    match expr {
        "true" | "True" => return Some(Value::Bool(true)),
        "false" | "False" => return Some(Value::Bool(false)),
        "null" | "None" => return Some(Value::Null),
        _ => {}
    }
    match serde_json::from_str::<Value>(expr) {
        Ok(v @ Value::Number(_)) => Some(v),
        _ => None,
    }
}

/// Resolve a dotted path; numeric segments index into lists.
pub fn lookup<'v>(vars: &'v Map<String, Value>, segments: &[&str]) -> Option<&'v Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = vars.get(*first)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Truthiness of a value the way the inventory host judges conditions.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn is_text_truthy(text: &str) -> bool {
    !matches!(text.trim(), "" | "false" | "False" | "FALSE" | "0" | "no" | "No" | "None" | "null")
}

// rendered helper output keeps booleans and numbers as such
fn coerce_rendered(text: String) -> Value {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(v @ Value::Bool(_)) | Ok(v @ Value::Number(_)) => v,
        _ => Value::String(text),
    }
}

// variable paths used as helper arguments, skipping helper names and literals
fn referenced_paths(expr: &str) -> Vec<String> {
    let mut tokens: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut helper_position = true;

    for c in expr.chars() {
        if let Some(q) = quote {
            if c == q { quote = None; }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.clear();
                helper_position = false;
            },
            '(' => {
                current.clear();
                helper_position = true;
            },
            ')' | ' ' | '\t' | '\n' => {
                if !current.is_empty() {
                    tokens.push((current.clone(), helper_position));
                    current.clear();
                    helper_position = false;
                }
            },
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push((current, helper_position));
    }

    tokens.into_iter()
        .filter(|(_, is_helper)| !is_helper)
        .map(|(token, _)| match token.split_once('=') {
            Some((_, value)) => value.to_string(),
            None => token,
        })
        .filter(|token| !token.is_empty() && parse_literal(token).is_none() && PATH_RE.is_match(token))
        .collect()
}

pub struct Templar {
    strict: Handlebars<'static>,
    lenient: Handlebars<'static>,
}

impl Default for Templar {
    fn default() -> Self {
        Self::new()
    }
}

impl Templar {

    pub fn new() -> Self {
        let mut strict = Handlebars::new();
        strict.set_strict_mode(true);
        strict.register_escape_fn(handlebars::no_escape);
        let mut lenient = Handlebars::new();
        lenient.register_escape_fn(handlebars::no_escape);
        Self { strict, lenient }
    }

    fn registry(&self, mode: TemplateMode) -> &Handlebars<'static> {
        match mode {
            TemplateMode::Strict => &self.strict,
            TemplateMode::Lenient => &self.lenient,
        }
    }

    pub fn render(&self, template: &str, vars: &Map<String, Value>, mode: TemplateMode) -> Result<String, String> {
        self.registry(mode).render_template(template, vars).map_err(
            |e| format!("Template error: {}", e)
        )
    }

    fn check_helper_references(&self, expr: &str, vars: &Map<String, Value>, mode: TemplateMode) -> Result<(), String> {
        if mode == TemplateMode::Lenient {
            return Ok(());
        }
        for path in referenced_paths(expr) {
            let segments: Vec<&str> = path.split('.').collect();
            if lookup(vars, &segments).is_none() {
                return Err(format!("'{}' is undefined", path));
            }
        }
        Ok(())
    }

    /// Evaluate an expression to a value. `Ok(None)` means an undefined path in
    /// lenient mode.
    pub fn evaluate(&self, expr: &str, vars: &Map<String, Value>, mode: TemplateMode) -> Result<Option<Value>, String> {
        match Expression::parse(expr) {
            Expression::Literal(v) => Ok(Some(v)),
            Expression::Path(segments) => match lookup(vars, &segments) {
                Some(v) => Ok(Some(v.clone())),
                None if mode == TemplateMode::Strict => Err(format!("'{}' is undefined", expr.trim())),
                None => Ok(None),
            },
            Expression::Template(t) => Ok(Some(Value::String(self.render(t, vars, mode)?))),
            Expression::Helper(h) => {
                self.check_helper_references(h, vars, mode)?;
                let rendered = self.render(&format!("{{{{{}}}}}", h), vars, mode)?;
                Ok(Some(coerce_rendered(rendered)))
            }
        }
    }

    /// Evaluate an expression as a conditional.
    pub fn test_condition(&self, expr: &str, vars: &Map<String, Value>, mode: TemplateMode) -> Result<bool, String> {
        match Expression::parse(expr) {
            Expression::Literal(v) => Ok(is_truthy(&v)),
            Expression::Path(segments) => match lookup(vars, &segments) {
                Some(v) => Ok(is_truthy(v)),
                None if mode == TemplateMode::Strict => Err(format!("'{}' is undefined", expr.trim())),
                None => Ok(false),
            },
            Expression::Template(t) => Ok(is_text_truthy(&self.render(t, vars, mode)?)),
            Expression::Helper(h) => {
                self.check_helper_references(h, vars, mode)?;
                let wrapped = format!("{{{{#if ({})}}}}true{{{{else}}}}false{{{{/if}}}}", h);
                let rendered = self.render(&wrapped, vars, mode)
                    .map_err(|e| format!("failed to parse conditional '{}': {}", h, e))?;
                Ok(rendered == "true")
            }
        }
    }
}
