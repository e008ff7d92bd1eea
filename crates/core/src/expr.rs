//! The small expression language evaluated at build and render time.
//!
//! MDX `{…}` expressions, JSX attribute values and simple ESM initializers
//! are parsed into [`Expr`] and evaluated against a [`Scope`] of JSON
//! values. Supported: literals (including template literals), identifiers,
//! member access, array and object literals, `!`, `===`/`!==`, `&&`, `||`,
//! `??` and the conditional operator. Anything else is rejected with
//! [`ExprError::Unsupported`].

use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

/// Expression evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Syntax outside the supported subset.
    #[error("Unsupported expression `{0}`")]
    Unsupported(String),
    /// An identifier with no binding.
    #[error("{0} is not defined")]
    Unbound(String),
    /// Member access on `null`/`undefined`.
    #[error("Cannot read properties of null (reading '{0}')")]
    NullAccess(String),
    /// A define value that does not parse.
    #[error("Invalid define value for \"{key}\": {value}")]
    InvalidDefine {
        /// Define key
        key: String,
        /// Raw value
        value: String,
    },
}

/// Binary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Nullish,
}

/// One piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text.
    Text(String),
    /// `${…}` substitution.
    Expr(Expr),
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Nothing but whitespace or comments.
    Empty,
    /// A literal value. `undefined` is represented as `null`.
    Literal(JsonValue),
    /// Template literal.
    Template(Vec<TemplatePart>),
    /// Bare identifier.
    Ident(String),
    /// `object.property`, `object[property]` or `object?.property`.
    Member {
        /// Accessed value.
        object: Box<Expr>,
        /// Property key.
        property: Box<Expr>,
        /// Optional chaining.
        optional: bool,
    },
    /// Array literal.
    Array(Vec<Expr>),
    /// Object literal.
    Object(Vec<(String, Expr)>),
    /// `!operand`
    Not(Box<Expr>),
    /// `===`, `!==`, `==` or `!=`.
    Equals {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// `!==`/`!=`.
        negated: bool,
    },
    /// `&&`, `||` or `??`.
    Logical {
        /// Operator.
        op: Logical,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// Condition.
        test: Box<Expr>,
        /// Value when truthy.
        consequent: Box<Expr>,
        /// Value when falsy.
        alternate: Box<Expr>,
    },
}

impl Expr {
    /// The dotted name of an identifier or static member chain, such as
    /// `process.env.NODE_ENV`.
    pub fn dotted(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Member {
                object, property, ..
            } => match property.as_ref() {
                Expr::Literal(JsonValue::String(key)) => {
                    Some(format!("{}.{}", object.dotted()?, key))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Parse `src` as a single expression.
pub fn parse_expression(src: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser { src, pos: 0 };
    parser.skip_trivia();
    if parser.at_end() {
        return Ok(Expr::Empty);
    }
    let expr = parser.conditional()?;
    parser.skip_trivia();
    if !parser.at_end() {
        return Err(parser.unsupported());
    }
    Ok(expr)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn unsupported(&self) -> ExprError {
        ExprError::Unsupported(self.src.trim().to_string())
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                self.pos += body.find("*/").map(|end| end + 4).unwrap_or(trimmed.len());
            } else {
                return;
            }
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_trivia();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), ExprError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unsupported())
        }
    }

    fn conditional(&mut self) -> Result<Expr, ExprError> {
        let test = self.logical()?;
        self.skip_trivia();
        let rest = self.rest();
        if rest.starts_with('?') && !rest.starts_with("??") && !rest.starts_with("?.") {
            self.pos += 1;
            let consequent = self.conditional()?;
            self.expect(":")?;
            let alternate = self.conditional()?;
            return Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }
        Ok(test)
    }

    fn logical(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.and()?;
        loop {
            let op = if self.eat("||") {
                Logical::Or
            } else if self.eat("??") {
                Logical::Nullish
            } else {
                return Ok(left);
            };
            let right = self.and()?;
            left = Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.equality()?;
        while self.eat("&&") {
            let right = self.equality()?;
            left = Expr::Logical {
                op: Logical::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.unary()?;
        loop {
            let negated = if self.eat("===") || self.eat("==") {
                false
            } else if self.eat("!==") || self.eat("!=") {
                true
            } else {
                return Ok(left);
            };
            let right = self.unary()?;
            left = Expr::Equals {
                left: Box::new(left),
                right: Box::new(right),
                negated,
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat("!") {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat("-") {
            return match self.unary()? {
                Expr::Literal(JsonValue::Number(n)) => {
                    Ok(Expr::Literal(number(-n.as_f64().unwrap_or_default())))
                }
                _ => Err(self.unsupported()),
            };
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn postfix(&mut self, mut expr: Expr) -> Result<Expr, ExprError> {
        loop {
            let optional = self.eat("?.");
            let property = if self.eat("[") {
                let key = self.conditional()?;
                self.expect("]")?;
                key
            } else if optional || self.eat(".") {
                self.skip_trivia();
                Expr::Literal(JsonValue::String(self.identifier()?))
            } else {
                return Ok(expr);
            };
            expr = Expr::Member {
                object: Box::new(expr),
                property: Box::new(property),
                optional,
            };
        }
    }

    fn identifier(&mut self) -> Result<String, ExprError> {
        let rest = self.rest();
        match rest.chars().next() {
            Some(ch) if is_ident_start(ch) => {}
            _ => return Err(self.unsupported()),
        }
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_continue(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_trivia();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => Ok(Expr::Literal(JsonValue::String(self.string(quote)?))),
            Some('`') => self.template(),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.number(),
            Some('[') => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.eat("]") {
                    items.push(self.conditional()?);
                    if !self.eat(",") {
                        self.expect("]")?;
                        break;
                    }
                }
                Ok(Expr::Array(items))
            }
            Some('{') => {
                self.pos += 1;
                let mut entries = Vec::new();
                while !self.eat("}") {
                    entries.push(self.property()?);
                    if !self.eat(",") {
                        self.expect("}")?;
                        break;
                    }
                }
                Ok(Expr::Object(entries))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.conditional()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(ch) if is_ident_start(ch) => {
                let word = self.identifier()?;
                Ok(match word.as_str() {
                    "true" => Expr::Literal(JsonValue::Bool(true)),
                    "false" => Expr::Literal(JsonValue::Bool(false)),
                    "null" | "undefined" => Expr::Literal(JsonValue::Null),
                    "function" | "class" | "new" | "async" | "await" | "typeof" => {
                        return Err(self.unsupported());
                    }
                    _ => Expr::Ident(word),
                })
            }
            _ => Err(self.unsupported()),
        }
    }

    fn property(&mut self) -> Result<(String, Expr), ExprError> {
        self.skip_trivia();
        let key = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote)?,
            Some(ch) if ch.is_ascii_digit() => match self.number()? {
                Expr::Literal(value) => to_js_string(&value),
                _ => return Err(self.unsupported()),
            },
            Some(ch) if is_ident_start(ch) => self.identifier()?,
            _ => return Err(self.unsupported()),
        };
        if self.eat(":") {
            Ok((key, self.conditional()?))
        } else {
            let shorthand = Expr::Ident(key.clone());
            Ok((key, shorthand))
        }
    }

    fn number(&mut self) -> Result<Expr, ExprError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let raw: String = rest[..len].chars().filter(|c| *c != '_').collect();
        self.pos += len;

        let value = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok().map(|n| n as f64)
        } else {
            raw.parse::<f64>().ok()
        };
        value
            .map(|n| Expr::Literal(number(n)))
            .ok_or_else(|| self.unsupported())
    }

    fn string(&mut self, quote: char) -> Result<String, ExprError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            let ch = self.peek().ok_or_else(|| self.unsupported())?;
            self.pos += ch.len_utf8();
            match ch {
                c if c == quote => return Ok(value),
                '\\' => value.push(self.escape()?),
                c => value.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ExprError> {
        let ch = self.peek().ok_or_else(|| self.unsupported())?;
        self.pos += ch.len_utf8();
        Ok(match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'u' => {
                let hex = self.rest().get(..4).ok_or_else(|| self.unsupported())?;
                let code = u32::from_str_radix(hex, 16).map_err(|_| self.unsupported())?;
                self.pos += 4;
                char::from_u32(code).ok_or_else(|| self.unsupported())?
            }
            other => other,
        })
    }

    fn template(&mut self) -> Result<Expr, ExprError> {
        self.pos += 1;
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            let ch = self.peek().ok_or_else(|| self.unsupported())?;
            if ch == '`' {
                self.pos += 1;
                break;
            }
            if self.rest().starts_with("${") {
                self.pos += 2;
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                parts.push(TemplatePart::Expr(self.conditional()?));
                self.expect("}")?;
                continue;
            }
            self.pos += ch.len_utf8();
            if ch == '\\' {
                text.push(self.escape()?);
            } else {
                text.push(ch);
            }
        }
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        Ok(Expr::Template(parts))
    }
}

fn number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        JsonValue::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// JavaScript `String(value)` of a JSON value.
pub fn to_js_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

/// Name lookup for identifiers.
pub trait Scope {
    /// The value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<JsonValue>;
}

impl Scope for BTreeMap<String, JsonValue> {
    fn lookup(&self, name: &str) -> Option<JsonValue> {
        self.get(name).cloned()
    }
}

impl Scope for Map<String, JsonValue> {
    fn lookup(&self, name: &str) -> Option<JsonValue> {
        self.get(name).cloned()
    }
}

/// Compile-time substitutions keyed by dotted name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defines {
    entries: BTreeMap<String, Expr>,
}

impl Defines {
    /// Parse raw define values, each a JavaScript expression.
    pub fn parse(raw: &BTreeMap<String, String>) -> Result<Self, ExprError> {
        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let expr = parse_expression(value).map_err(|_| ExprError::InvalidDefine {
                key: key.clone(),
                value: value.clone(),
            })?;
            entries.insert(key.clone(), expr);
        }
        Ok(Self { entries })
    }

    /// The substitution for `key`.
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.entries.get(key)
    }

    /// Whether no substitutions are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evaluates expressions against a scope and a set of defines.
pub struct Evaluator<'a> {
    scope: &'a dyn Scope,
    defines: &'a Defines,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator.
    pub fn new(scope: &'a dyn Scope, defines: &'a Defines) -> Self {
        Self { scope, defines }
    }

    /// Evaluate `expr`. `Empty` and `undefined` evaluate to `null`.
    pub fn evaluate(&self, expr: &Expr) -> Result<JsonValue, ExprError> {
        Ok(self.chain(expr)?.unwrap_or(JsonValue::Null))
    }

    /// Parse and evaluate `src`.
    pub fn evaluate_str(&self, src: &str) -> Result<JsonValue, ExprError> {
        self.evaluate(&parse_expression(src)?)
    }

    fn substitution(&self, expr: &Expr) -> Result<Option<JsonValue>, ExprError> {
        if self.defines.is_empty() {
            return Ok(None);
        }
        let Some(replacement) = expr.dotted().and_then(|name| self.defines.get(&name)) else {
            return Ok(None);
        };
        let plain = Defines::default();
        Evaluator::new(self.scope, &plain).evaluate(replacement).map(Some)
    }

    // `None` marks a short-circuited optional chain.
    fn chain(&self, expr: &Expr) -> Result<Option<JsonValue>, ExprError> {
        if let Some(value) = self.substitution(expr)? {
            return Ok(Some(value));
        }

        let value = match expr {
            Expr::Empty => JsonValue::Null,
            Expr::Literal(value) => value.clone(),
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(expr) => out.push_str(&to_js_string(&self.evaluate(expr)?)),
                    }
                }
                JsonValue::String(out)
            }
            Expr::Ident(name) => self
                .scope
                .lookup(name)
                .ok_or_else(|| ExprError::Unbound(name.clone()))?,
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let Some(target) = self.chain(object)? else {
                    return Ok(None);
                };
                let key = to_js_string(&self.evaluate(property)?);
                if target.is_null() {
                    if *optional {
                        return Ok(None);
                    }
                    return Err(ExprError::NullAccess(key));
                }
                member(&target, &key)
            }
            Expr::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.evaluate(value)?);
                }
                JsonValue::Object(map)
            }
            Expr::Not(operand) => JsonValue::Bool(!is_truthy(&self.evaluate(operand)?)),
            Expr::Equals {
                left,
                right,
                negated,
            } => {
                let equal = self.evaluate(left)? == self.evaluate(right)?;
                JsonValue::Bool(equal != *negated)
            }
            Expr::Logical { op, left, right } => {
                let left = self.evaluate(left)?;
                let take_left = match op {
                    Logical::And => !is_truthy(&left),
                    Logical::Or => is_truthy(&left),
                    Logical::Nullish => !left.is_null(),
                };
                if take_left { left } else { self.evaluate(right)? }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if is_truthy(&self.evaluate(test)?) {
                    self.evaluate(consequent)?
                } else {
                    self.evaluate(alternate)?
                }
            }
        };
        Ok(Some(value))
    }
}

fn member(target: &JsonValue, key: &str) -> JsonValue {
    match target {
        JsonValue::Object(map) => map.get(key).cloned().unwrap_or(JsonValue::Null),
        JsonValue::Array(items) if key == "length" => JsonValue::from(items.len()),
        JsonValue::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index).cloned())
            .unwrap_or(JsonValue::Null),
        JsonValue::String(s) if key == "length" => JsonValue::from(s.encode_utf16().count()),
        _ => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(src: &str, scope: &BTreeMap<String, JsonValue>) -> Result<JsonValue, ExprError> {
        Evaluator::new(scope, &Defines::default()).evaluate_str(src)
    }

    fn scope() -> BTreeMap<String, JsonValue> {
        let mut scope = BTreeMap::new();
        scope.insert(
            "frontmatter".to_string(),
            json!({ "title": "Guide", "tags": ["a", "b"], "draft": false }),
        );
        scope.insert("logo".to_string(), json!("./logo.png"));
        scope
    }

    #[test]
    fn literals() {
        let scope = BTreeMap::new();
        assert_eq!(eval("'hi'", &scope).unwrap(), json!("hi"));
        assert_eq!(eval("\"a\\nb\"", &scope).unwrap(), json!("a\nb"));
        assert_eq!(eval("42", &scope).unwrap(), json!(42));
        assert_eq!(eval("-1.5", &scope).unwrap(), json!(-1.5));
        assert_eq!(eval("true", &scope).unwrap(), json!(true));
        assert_eq!(eval("undefined", &scope).unwrap(), JsonValue::Null);
        assert_eq!(eval("`plain`", &scope).unwrap(), json!("plain"));
        assert_eq!(
            eval("[1, 'two', { three: 3, 'four': [4], }]", &scope).unwrap(),
            json!([1, "two", { "three": 3, "four": [4] }])
        );
    }

    #[test]
    fn comments_only_is_empty() {
        assert_eq!(parse_expression("/* note */").unwrap(), Expr::Empty);
        assert_eq!(parse_expression("  // note\n ").unwrap(), Expr::Empty);
        assert_eq!(parse_expression("/* a */ 1 /* b */").unwrap(), Expr::Literal(json!(1)));
    }

    #[test]
    fn member_access() {
        let scope = scope();
        assert_eq!(eval("frontmatter.title", &scope).unwrap(), json!("Guide"));
        assert_eq!(eval("frontmatter['tags'][1]", &scope).unwrap(), json!("b"));
        assert_eq!(eval("frontmatter.tags.length", &scope).unwrap(), json!(2));
        assert_eq!(eval("frontmatter.missing", &scope).unwrap(), JsonValue::Null);
        assert_eq!(eval("frontmatter.missing?.deep", &scope).unwrap(), JsonValue::Null);
        assert_eq!(
            eval("frontmatter.missing.deep", &scope),
            Err(ExprError::NullAccess("deep".into()))
        );
    }

    #[test]
    fn unbound_identifier() {
        assert_eq!(
            eval("nope.value", &scope()),
            Err(ExprError::Unbound("nope".into()))
        );
    }

    #[test]
    fn operators() {
        let scope = scope();
        assert_eq!(eval("frontmatter.draft ? 'x' : 'y'", &scope).unwrap(), json!("y"));
        assert_eq!(eval("frontmatter.author ?? 'anon'", &scope).unwrap(), json!("anon"));
        assert_eq!(eval("frontmatter.draft || 'fallback'", &scope).unwrap(), json!("fallback"));
        assert_eq!(eval("frontmatter.title && 1", &scope).unwrap(), json!(1));
        assert_eq!(eval("!frontmatter.draft", &scope).unwrap(), json!(true));
        assert_eq!(eval("frontmatter.title === 'Guide'", &scope).unwrap(), json!(true));
        assert_eq!(eval("logo !== './logo.png'", &scope).unwrap(), json!(false));
    }

    #[test]
    fn template_substitution() {
        assert_eq!(
            eval("`${frontmatter.title} (${frontmatter.tags})`", &scope()).unwrap(),
            json!("Guide (a,b)")
        );
    }

    #[test]
    fn defines_use_the_longest_dotted_name() {
        let mut raw = BTreeMap::new();
        raw.insert("process.env.NODE_ENV".to_string(), "\"production\"".to_string());
        raw.insert("process.env".to_string(), "{}".to_string());
        raw.insert("process.env.__TESTING__".to_string(), "true".to_string());
        let defines = Defines::parse(&raw).unwrap();
        let scope: BTreeMap<String, JsonValue> = BTreeMap::new();
        let evaluator = Evaluator::new(&scope, &defines);

        assert_eq!(
            evaluator.evaluate_str("process.env.NODE_ENV").unwrap(),
            json!("production")
        );
        assert_eq!(
            evaluator.evaluate_str("process.env.__TESTING__").unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluator.evaluate_str("process.env.OTHER").unwrap(),
            JsonValue::Null
        );
        assert_eq!(
            evaluator.evaluate_str("process.version"),
            Err(ExprError::Unbound("process".into()))
        );
    }

    #[test]
    fn invalid_define_is_rejected() {
        let mut raw = BTreeMap::new();
        raw.insert("DEBUG".to_string(), "(".to_string());
        assert!(matches!(
            Defines::parse(&raw),
            Err(ExprError::InvalidDefine { .. })
        ));
    }

    #[test]
    fn calls_are_unsupported() {
        assert!(matches!(
            parse_expression("items.map(x => x)"),
            Err(ExprError::Unsupported(_))
        ));
    }

    #[test]
    fn js_string_conversion() {
        assert_eq!(to_js_string(&json!(null)), "null");
        assert_eq!(to_js_string(&json!(3.0)), "3");
        assert_eq!(to_js_string(&json!(2.5)), "2.5");
        assert_eq!(to_js_string(&json!([1, null, "x"])), "1,,x");
        assert_eq!(to_js_string(&json!({"a": 1})), "[object Object]");
    }
}
