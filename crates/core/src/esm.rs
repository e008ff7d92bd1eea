//! Top-level `import`/`export` scanning for JavaScript and MDX ESM blocks.
//!
//! Only the module interface is recovered: what is imported from where,
//! and what each export is bound to. Function bodies are skipped by
//! tracking bracket depth, so JSX or statements nested inside them are
//! never interpreted.

use std::collections::BTreeMap;
use std::fmt;

/// One binding introduced by an `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSpecifier {
    /// `import local from "…"`
    Default {
        /// Local binding name.
        local: String,
    },
    /// `import { imported as local } from "…"`
    Named {
        /// Exported name in the source module.
        imported: String,
        /// Local binding name.
        local: String,
    },
    /// `import * as local from "…"`
    Namespace {
        /// Local binding name.
        local: String,
    },
}

impl ImportSpecifier {
    /// The local name this specifier binds.
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Named { local, .. }
            | ImportSpecifier::Namespace { local } => local,
        }
    }
}

/// An `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Module specifier as written.
    pub source: String,
    /// Bindings; empty for side-effect imports.
    pub specifiers: Vec<ImportSpecifier>,
}

/// What an exported (or top-level) name is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportKind {
    /// A function, class or arrow function. `name` is the declared name.
    Component {
        /// Declared name, absent for anonymous defaults.
        name: Option<String>,
    },
    /// Any other initializer, kept as source text.
    Expression(String),
    /// Alias of another top-level binding.
    Local(String),
    /// `export { imported as name } from "source"`
    Reexport {
        /// Module specifier.
        source: String,
        /// Exported name in that module.
        imported: String,
    },
    /// `export * as name from "source"`
    ReexportNamespace {
        /// Module specifier.
        source: String,
    },
}

/// One exported name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDecl {
    /// Exported name; `default` for default exports.
    pub name: String,
    /// Binding.
    pub kind: ExportKind,
}

/// The recovered interface of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    /// Imports in source order.
    pub imports: Vec<ImportDecl>,
    /// Exports in source order.
    pub exports: Vec<ExportDecl>,
    /// Sources of `export * from "…"`.
    pub star_exports: Vec<String>,
    /// Top-level declarations, exported or not.
    pub locals: BTreeMap<String, ExportKind>,
}

impl ModuleSyntax {
    /// Every module specifier this module depends on, in source order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.imports.iter().map(|i| i.source.as_str()).collect();
        for export in &self.exports {
            match &export.kind {
                ExportKind::Reexport { source, .. } | ExportKind::ReexportNamespace { source } => {
                    sources.push(source)
                }
                _ => {}
            }
        }
        sources.extend(self.star_exports.iter().map(String::as_str));
        sources
    }
}

/// Malformed `import`/`export` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsmError {
    /// What went wrong.
    pub message: String,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

impl fmt::Display for EsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for EsmError {}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Template,
    Num,
    Regex,
    Punct(&'static str),
    Other(char),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    start: usize,
    end: usize,
    newline_before: bool,
}

const PUNCTS: [&str; 13] = [
    "=>", "...", "{", "}", "(", ")", "[", "]", ";", ",", "*", "=", ".",
];

const STATEMENT_KEYWORDS: [&str; 7] = ["import", "export", "const", "let", "var", "function", "class"];

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn regex_allowed(previous: Option<&Token>) -> bool {
    match previous.map(|t| &t.tok) {
        None => true,
        Some(Tok::Punct(p)) => matches!(*p, "(" | "," | "=" | "[" | "{" | ";" | "=>"),
        Some(Tok::Other(c)) => matches!(c, ':' | '!' | '&' | '|' | '?' | '+' | '-'),
        Some(Tok::Ident(word)) => word == "return" || word == "typeof",
        _ => false,
    }
}

/// Lenient tokenizer: anything it cannot classify becomes `Other`, and an
/// unterminated quote is a lone `Other` rather than an error, since JSX
/// text inside function bodies is not JavaScript.
fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0usize;
    let mut newline = true;

    while let Some(ch) = src[pos..].chars().next() {
        let start = pos;
        let rest = &src[pos..];

        if ch == '\n' {
            newline = true;
            pos += 1;
            continue;
        }
        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }
        if rest.starts_with("//") {
            pos += rest.find('\n').unwrap_or(rest.len());
            continue;
        }
        if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => {
                    if rest[..end + 2].contains('\n') {
                        newline = true;
                    }
                    pos += end + 4;
                }
                None => pos = src.len(),
            }
            continue;
        }

        let tok = if ch == '"' || ch == '\'' {
            match read_string(rest, ch) {
                Some((value, len)) => {
                    pos += len;
                    Tok::Str(value)
                }
                None => {
                    pos += 1;
                    Tok::Other(ch)
                }
            }
        } else if ch == '`' {
            pos += template_len(rest);
            Tok::Template
        } else if ch == '/' && regex_allowed(tokens.last()) {
            pos += regex_len(rest);
            Tok::Regex
        } else if is_ident_start(ch) {
            let len = rest
                .char_indices()
                .find(|(_, c)| !is_ident_continue(*c))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            pos += len;
            Tok::Ident(rest[..len].to_string())
        } else if ch.is_ascii_digit() {
            let len = rest
                .char_indices()
                .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '_'))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            pos += len;
            Tok::Num
        } else if let Some(punct) = PUNCTS.iter().find(|p| rest.starts_with(**p)) {
            pos += punct.len();
            Tok::Punct(*punct)
        } else {
            pos += ch.len_utf8();
            Tok::Other(ch)
        };

        tokens.push(Token {
            tok,
            start,
            end: pos,
            newline_before: newline,
        });
        newline = false;
    }

    tokens
}

/// Decodes a quoted string literal starting at `rest[0]`. Returns `None`
/// if a line break or end of input comes first.
fn read_string(rest: &str, quote: char) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, ch)) = chars.next() {
        match ch {
            c if c == quote => return Some((value, i + 1)),
            '\n' => return None,
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '0' => value.push('\0'),
                    'u' => {
                        let hex: String = rest[i + 2..].chars().take(4).collect();
                        let code = u32::from_str_radix(&hex, 16).ok()?;
                        value.push(char::from_u32(code)?);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    '\n' => {}
                    other => value.push(other),
                }
            }
            other => value.push(other),
        }
    }
    None
}

fn template_len(rest: &str) -> usize {
    let mut depth = 0usize;
    let mut escaped = false;
    let bytes = rest.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        let b = bytes[i];
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if depth == 0 && b == b'`' {
            return i + 1;
        } else if b == b'$' && bytes.get(i + 1) == Some(&b'{') {
            depth += 1;
            i += 1;
        } else if b == b'}' && depth > 0 {
            depth -= 1;
        }
        i += 1;
    }
    rest.len()
}

fn regex_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut in_class = false;
    let mut escaped = false;
    let mut i = 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            // Not a regex after all; consume only the slash.
            return 1;
        }
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == b'[' {
            in_class = true;
        } else if b == b']' {
            in_class = false;
        } else if b == b'/' && !in_class {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            return i;
        }
        i += 1;
    }
    1
}

fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let before = &src[..offset.min(src.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|nl| before[nl + 1..].chars().count() + 1)
        .unwrap_or_else(|| before.chars().count() + 1);
    (line, column)
}

struct Scanner<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    syntax: ModuleSyntax,
}

/// Scan `src` for its top-level imports and exports.
pub fn scan_module(src: &str) -> Result<ModuleSyntax, EsmError> {
    let mut scanner = Scanner {
        src,
        tokens: tokenize(src),
        pos: 0,
        depth: 0,
        syntax: ModuleSyntax::default(),
    };
    scanner.run()?;
    Ok(scanner.syntax)
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Tok::Ident(word)) => Some(word),
            _ => None,
        }
    }

    fn at_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Tok::Punct(p)) if *p == punct)
    }

    fn at_ident(&self, word: &str) -> bool {
        self.peek_ident() == Some(word)
    }

    fn error(&self, message: impl Into<String>) -> EsmError {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|t| t.start)
            .unwrap_or(self.src.len());
        let (line, column) = line_column(self.src, offset);
        EsmError {
            message: message.into(),
            line,
            column,
        }
    }

    fn expect_ident(&mut self) -> Result<String, EsmError> {
        match self.peek() {
            Some(Tok::Ident(word)) => {
                let word = word.clone();
                self.pos += 1;
                Ok(word)
            }
            _ => Err(self.error("Expected an identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, EsmError> {
        match self.peek() {
            Some(Tok::Str(value)) => {
                let value = value.clone();
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("Expected a string literal")),
        }
    }

    fn expect_from(&mut self) -> Result<String, EsmError> {
        if !self.at_ident("from") {
            return Err(self.error("Expected \"from\""));
        }
        self.pos += 1;
        let source = self.expect_string()?;
        self.skip_import_attributes();
        Ok(source)
    }

    fn skip_import_attributes(&mut self) {
        if (self.at_ident("with") || self.at_ident("assert"))
            && matches!(self.peek_at(1), Some(Tok::Punct("{")))
        {
            self.pos += 1;
            self.skip_group();
        }
    }

    /// Skip a bracketed group starting at the current opener.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::Punct("{") | Tok::Punct("(") | Tok::Punct("[") => depth += 1,
                Tok::Punct("}") | Tok::Punct(")") | Tok::Punct("]") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn at_statement_start(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        let token = &self.tokens[self.pos];
        token.newline_before
            || matches!(
                self.tokens[self.pos - 1].tok,
                Tok::Punct(";") | Tok::Punct("}")
            )
    }

    fn run(&mut self) -> Result<(), EsmError> {
        while let Some(tok) = self.peek().cloned() {
            if self.depth == 0 {
                match &tok {
                    Tok::Ident(word) if word == "import" => {
                        if !matches!(self.peek_at(1), Some(Tok::Punct("(")) | Some(Tok::Punct(".")))
                        {
                            self.parse_import()?;
                            continue;
                        }
                    }
                    Tok::Ident(word) if word == "export" => {
                        self.parse_export()?;
                        continue;
                    }
                    Tok::Ident(word)
                        if matches!(word.as_str(), "function" | "class" | "async")
                            && self.at_statement_start() =>
                    {
                        if let Some(name) = self.parse_declaration_head() {
                            self.syntax.locals.insert(
                                name.clone(),
                                ExportKind::Component { name: Some(name) },
                            );
                        }
                        continue;
                    }
                    Tok::Ident(word)
                        if matches!(word.as_str(), "const" | "let" | "var")
                            && self.at_statement_start() =>
                    {
                        self.pos += 1;
                        for (name, kind) in self.parse_declarators() {
                            self.syntax.locals.insert(name, kind);
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            match tok {
                Tok::Punct("{") | Tok::Punct("(") | Tok::Punct("[") => self.depth += 1,
                Tok::Punct("}") | Tok::Punct(")") | Tok::Punct("]") => {
                    self.depth = self.depth.saturating_sub(1)
                }
                _ => {}
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_import(&mut self) -> Result<(), EsmError> {
        self.pos += 1;

        if let Some(Tok::Str(source)) = self.peek() {
            let source = source.clone();
            self.pos += 1;
            self.skip_import_attributes();
            self.syntax.imports.push(ImportDecl {
                source,
                specifiers: Vec::new(),
            });
            return Ok(());
        }

        // `import type { … }` carries no runtime bindings.
        if self.at_ident("type") && !matches!(self.peek_at(1), Some(Tok::Ident(w)) if w == "from")
        {
            while self.peek().is_some() && !self.at_ident("from") {
                self.pos += 1;
            }
            self.expect_from()?;
            return Ok(());
        }

        let mut specifiers = Vec::new();
        if let Some(local) = self.peek_ident().map(str::to_string) {
            self.pos += 1;
            specifiers.push(ImportSpecifier::Default { local });
            if self.at_punct(",") {
                self.pos += 1;
            }
        }

        if self.at_punct("*") {
            self.pos += 1;
            if !self.at_ident("as") {
                return Err(self.error("Expected \"as\" after \"*\""));
            }
            self.pos += 1;
            let local = self.expect_ident()?;
            specifiers.push(ImportSpecifier::Namespace { local });
        } else if self.at_punct("{") {
            self.pos += 1;
            for (imported, local) in self.parse_specifier_list()? {
                specifiers.push(ImportSpecifier::Named { imported, local });
            }
        }

        if specifiers.is_empty() {
            return Err(self.error("Expected import bindings"));
        }

        let source = self.expect_from()?;
        self.syntax.imports.push(ImportDecl { source, specifiers });
        Ok(())
    }

    /// Parses `a, b as c, "d-e" as f }` after an opening brace.
    fn parse_specifier_list(&mut self) -> Result<Vec<(String, String)>, EsmError> {
        let mut pairs = Vec::new();
        loop {
            if self.at_punct("}") {
                self.pos += 1;
                return Ok(pairs);
            }
            if self.at_ident("type")
                && matches!(self.peek_at(1), Some(Tok::Ident(w)) if w != "as")
            {
                self.pos += 1;
            }
            let name = match self.peek() {
                Some(Tok::Ident(word)) => word.clone(),
                Some(Tok::Str(value)) => value.clone(),
                _ => return Err(self.error("Expected a binding name")),
            };
            self.pos += 1;
            let alias = if self.at_ident("as") {
                self.pos += 1;
                match self.peek() {
                    Some(Tok::Ident(word)) | Some(Tok::Str(word)) => {
                        let word = word.clone();
                        self.pos += 1;
                        word
                    }
                    _ => return Err(self.error("Expected a name after \"as\"")),
                }
            } else {
                name.clone()
            };
            pairs.push((name, alias));

            if self.at_punct(",") {
                self.pos += 1;
            } else if !self.at_punct("}") {
                return Err(self.error("Expected \",\" or \"}\""));
            }
        }
    }

    /// Consumes `[async] function [*] [Name]` or `class [Name]`, leaving the
    /// parameters and body for the main loop.
    fn parse_declaration_head(&mut self) -> Option<String> {
        if self.at_ident("async") {
            if !matches!(self.peek_at(1), Some(Tok::Ident(w)) if w == "function") {
                self.pos += 1;
                return None;
            }
            self.pos += 1;
        }
        self.pos += 1;
        if self.at_punct("*") {
            self.pos += 1;
        }
        match self.peek_ident() {
            Some(word) if word != "extends" => {
                let name = word.to_string();
                self.pos += 1;
                Some(name)
            }
            _ => None,
        }
    }

    /// Parses `a = …, b = …` after `const`/`let`/`var`.
    fn parse_declarators(&mut self) -> Vec<(String, ExportKind)> {
        let mut declared = Vec::new();
        loop {
            match self.peek() {
                Some(Tok::Ident(name)) => {
                    let name = name.clone();
                    self.pos += 1;
                    if self.at_punct("=") {
                        self.pos += 1;
                        let kind = self.read_initializer(Some(&name));
                        declared.push((name, kind));
                    }
                }
                Some(Tok::Punct("{")) | Some(Tok::Punct("[")) => {
                    self.skip_group();
                    if self.at_punct("=") {
                        self.pos += 1;
                        self.read_initializer(None);
                    }
                }
                _ => return declared,
            }
            if self.at_punct(",") {
                self.pos += 1;
            } else {
                return declared;
            }
        }
    }

    /// Reads an initializer up to the end of its statement and classifies it.
    fn read_initializer(&mut self, name: Option<&str>) -> ExportKind {
        let first = self.pos;
        let mut depth = 0usize;
        let mut arrow = false;

        while let Some(token) = self.tokens.get(self.pos) {
            if depth == 0 && self.pos > first {
                let ends_statement = matches!(token.tok, Tok::Punct(";") | Tok::Punct(","))
                    || (token.newline_before
                        && matches!(&token.tok, Tok::Ident(w) if STATEMENT_KEYWORDS.contains(&w.as_str())));
                if ends_statement {
                    break;
                }
            }
            match token.tok {
                Tok::Punct("{") | Tok::Punct("(") | Tok::Punct("[") => depth += 1,
                Tok::Punct("}") | Tok::Punct(")") | Tok::Punct("]") => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Tok::Punct("=>") => arrow = true,
                _ => {}
            }
            self.pos += 1;
        }

        let tokens = &self.tokens[first..self.pos];
        let Some((head, tail)) = tokens.split_first() else {
            return ExportKind::Expression(String::new());
        };
        let is_function = matches!(
            &head.tok,
            Tok::Ident(w) if matches!(w.as_str(), "function" | "class" | "async")
        );
        if is_function || arrow {
            return ExportKind::Component {
                name: name.map(str::to_string),
            };
        }
        if let (Tok::Ident(word), true) = (&head.tok, tail.is_empty())
            && !matches!(word.as_str(), "true" | "false" | "null" | "undefined")
        {
            return ExportKind::Local(word.clone());
        }

        let end = tokens.last().map(|t| t.end).unwrap_or(head.end);
        ExportKind::Expression(self.src[head.start..end].to_string())
    }

    fn push_export(&mut self, name: impl Into<String>, kind: ExportKind) {
        self.syntax.exports.push(ExportDecl {
            name: name.into(),
            kind,
        });
    }

    fn parse_export(&mut self) -> Result<(), EsmError> {
        self.pos += 1;

        if self.at_ident("default") {
            self.pos += 1;
            let is_declaration = match self.peek_ident() {
                Some("function") | Some("class") => true,
                Some("async") => matches!(self.peek_at(1), Some(Tok::Ident(w)) if w == "function"),
                _ => false,
            };
            if is_declaration {
                let name = self.parse_declaration_head();
                if let Some(name) = &name {
                    self.syntax.locals.insert(
                        name.clone(),
                        ExportKind::Component {
                            name: Some(name.clone()),
                        },
                    );
                }
                self.push_export("default", ExportKind::Component { name });
            } else {
                let kind = self.read_initializer(None);
                self.push_export("default", kind);
            }
            return Ok(());
        }

        match self.peek() {
            Some(Tok::Ident(word)) if matches!(word.as_str(), "function" | "class" | "async") => {
                let Some(name) = self.parse_declaration_head() else {
                    return Err(self.error("Exported declarations need a name"));
                };
                let kind = ExportKind::Component {
                    name: Some(name.clone()),
                };
                self.syntax.locals.insert(name.clone(), kind.clone());
                self.push_export(name, kind);
                Ok(())
            }
            Some(Tok::Ident(word)) if matches!(word.as_str(), "const" | "let" | "var") => {
                self.pos += 1;
                for (name, kind) in self.parse_declarators() {
                    self.syntax.locals.insert(name.clone(), kind.clone());
                    self.push_export(name, kind);
                }
                Ok(())
            }
            Some(Tok::Punct("{")) => {
                self.pos += 1;
                let pairs = self.parse_specifier_list()?;
                let source = if self.at_ident("from") {
                    Some(self.expect_from()?)
                } else {
                    None
                };
                for (local, exported) in pairs {
                    let kind = match &source {
                        Some(source) => ExportKind::Reexport {
                            source: source.clone(),
                            imported: local,
                        },
                        None => ExportKind::Local(local),
                    };
                    self.push_export(exported, kind);
                }
                Ok(())
            }
            Some(Tok::Punct("*")) => {
                self.pos += 1;
                let alias = if self.at_ident("as") {
                    self.pos += 1;
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                let source = self.expect_from()?;
                match alias {
                    Some(alias) => self.push_export(alias, ExportKind::ReexportNamespace { source }),
                    None => self.syntax.star_exports.push(source),
                }
                Ok(())
            }
            // TypeScript-only exports have no runtime value.
            Some(Tok::Ident(word))
                if matches!(
                    word.as_str(),
                    "type" | "interface" | "enum" | "declare" | "namespace" | "abstract"
                ) =>
            {
                Ok(())
            }
            _ => Err(self.error("Unexpected token after \"export\"")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> ModuleSyntax {
        scan_module(src).expect("scan should succeed")
    }

    #[test]
    fn import_forms() {
        let syntax = scan(
            "import logo from './logo.png'\n\
             import { Screenshot, Card as Tile } from \"@/components/screenshot\"\n\
             import * as ui from '../ui'\n\
             import React, { useState } from 'react'\n\
             import './styles.css'\n",
        );
        assert_eq!(syntax.imports.len(), 5);
        assert_eq!(syntax.imports[0].source, "./logo.png");
        assert_eq!(
            syntax.imports[0].specifiers,
            vec![ImportSpecifier::Default {
                local: "logo".into()
            }]
        );
        assert_eq!(
            syntax.imports[1].specifiers[1],
            ImportSpecifier::Named {
                imported: "Card".into(),
                local: "Tile".into()
            }
        );
        assert_eq!(
            syntax.imports[2].specifiers,
            vec![ImportSpecifier::Namespace { local: "ui".into() }]
        );
        assert_eq!(syntax.imports[3].specifiers.len(), 2);
        assert!(syntax.imports[4].specifiers.is_empty());
    }

    #[test]
    fn type_only_imports_are_dropped() {
        let syntax = scan("import type { Props } from './types'\nimport { a } from './a'");
        assert_eq!(syntax.imports.len(), 1);
        assert_eq!(syntax.imports[0].source, "./a");
    }

    #[test]
    fn exports_of_a_component_module() {
        let syntax = scan(
            "import cn from 'clsx'\n\
             \n\
             export function Screenshot({ src, alt, full }) {\n\
               return (\n\
                 <div className={cn('a', full ? 'b' : 'c')}>\n\
                   <img src={src} alt={alt} />\n\
                 </div>\n\
               )\n\
             }\n\
             export const Badge = ({ children }) => <span>{children}</span>\n\
             export const version = \"1.2.0\"\n",
        );
        let names: Vec<_> = syntax.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Screenshot", "Badge", "version"]);
        assert_eq!(
            syntax.exports[0].kind,
            ExportKind::Component {
                name: Some("Screenshot".into())
            }
        );
        assert_eq!(
            syntax.exports[1].kind,
            ExportKind::Component {
                name: Some("Badge".into())
            }
        );
        assert_eq!(
            syntax.exports[2].kind,
            ExportKind::Expression("\"1.2.0\"".into())
        );
    }

    #[test]
    fn jsx_text_inside_bodies_is_ignored() {
        let syntax = scan(
            "export function Note() {\n  return <p>It's a note, isn't it? see http://x</p>\n}\n\
             export default Note\n",
        );
        assert_eq!(syntax.exports.len(), 2);
        assert_eq!(syntax.exports[1].name, "default");
        assert_eq!(syntax.exports[1].kind, ExportKind::Local("Note".into()));
    }

    #[test]
    fn default_export_forms() {
        let named = scan("export default function Hero() { return null }");
        assert_eq!(
            named.exports[0].kind,
            ExportKind::Component {
                name: Some("Hero".into())
            }
        );
        assert!(named.locals.contains_key("Hero"));

        let anonymous = scan("export default (props) => null");
        assert_eq!(
            anonymous.exports[0].kind,
            ExportKind::Component { name: None }
        );

        let value = scan("export default { title: 'Docs' };");
        assert_eq!(
            value.exports[0].kind,
            ExportKind::Expression("{ title: 'Docs' }".into())
        );
    }

    #[test]
    fn export_lists_and_reexports() {
        let syntax = scan(
            "function Card() {}\n\
             const size = 3\n\
             export { Card, size as defaultSize }\n\
             export { Screenshot as Shot, default as Logo } from './screenshot'\n\
             export * from './more'\n\
             export * as icons from './icons'\n",
        );
        assert_eq!(syntax.exports[0].kind, ExportKind::Local("Card".into()));
        assert_eq!(syntax.exports[1].name, "defaultSize");
        assert_eq!(
            syntax.exports[2],
            ExportDecl {
                name: "Shot".into(),
                kind: ExportKind::Reexport {
                    source: "./screenshot".into(),
                    imported: "Screenshot".into()
                }
            }
        );
        assert_eq!(syntax.exports[3].name, "Logo");
        assert_eq!(syntax.star_exports, vec!["./more".to_string()]);
        assert_eq!(
            syntax.exports[4].kind,
            ExportKind::ReexportNamespace {
                source: "./icons".into()
            }
        );
        assert_eq!(
            syntax.locals.get("size"),
            Some(&ExportKind::Expression("3".into()))
        );
        assert_eq!(
            syntax.dependencies(),
            vec!["./screenshot", "./screenshot", "./icons", "./more"]
        );
    }

    #[test]
    fn multiple_declarators_and_semicolons() {
        let syntax = scan("export const a = 1, b = [1, 2]; export let c = 'x'");
        let names: Vec<_> = syntax.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(
            syntax.exports[1].kind,
            ExportKind::Expression("[1, 2]".into())
        );
    }

    #[test]
    fn strings_with_keywords_do_not_confuse_the_scanner() {
        let syntax = scan("const s = \"export const x = 1\"\n// import y from 'z'\n/* export z */");
        assert!(syntax.exports.is_empty());
        assert!(syntax.imports.is_empty());
        assert!(syntax.locals.contains_key("s"));
    }

    #[test]
    fn dynamic_import_is_not_a_declaration() {
        let syntax = scan("const mod = import('./lazy')\nconsole.log(import.meta.url)");
        assert!(syntax.imports.is_empty());
    }

    #[test]
    fn string_escapes_are_decoded() {
        let syntax = scan(r#"import a from "./space \"q\".png""#);
        assert_eq!(syntax.imports[0].source, "./space \"q\".png");
    }

    #[test]
    fn malformed_import_reports_position() {
        let err = scan_module("\nimport { a } './a'").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("from"));
    }
}
