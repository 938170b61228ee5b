// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Python source scanning.
//!
//! Recovers the module-level structure discovery needs: top-level classes
//! with their bases, method names and nested classes, and top-level
//! function names.
//! Comments and string contents are dropped before matching, so docstrings
//! and commented-out code never produce tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

/// Class header: `class Name` (bases and colon are parsed separately).
#[allow(clippy::expect_used)]
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([^\W\d]\w*)").expect("valid regex"));

/// Function header up to its opening parenthesis.
#[allow(clippy::expect_used)]
static DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?def\s+([^\W\d]\w*)\s*(?:\[[^\]]*\])?\s*\(").expect("valid regex")
});

/// Compound statements whose bodies stay in the enclosing scope.
#[allow(clippy::expect_used)]
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:if|elif|else|for|while|with|try|except|finally|match|case|async\s+(?:for|with))\b")
        .expect("valid regex")
});

/// A class defined at module level or directly inside another class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyClass {
    pub name: String,
    /// Base expressions with keyword arguments and subscripts removed.
    pub bases: Vec<String>,
    /// Methods defined directly in the class body, in source order.
    pub methods: Vec<String>,
    /// Classes defined directly in the class body, in source order.
    pub children: Vec<PyClass>,
    /// 1-based line of the class header.
    pub line: usize,
}

impl PyClass {
    /// Whether any base's last dotted segment ends in `TestCase`.
    pub fn extends_test_case(&self) -> bool {
        self.bases
            .iter()
            .any(|b| b.rsplit('.').next().is_some_and(|s| s.ends_with("TestCase")))
    }
}

/// Module-level structure of one Python file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyModule {
    pub classes: Vec<PyClass>,
    /// Functions defined at module level, in source order.
    pub functions: Vec<String>,
}

impl PyModule {
    /// Methods of `class` matching `keep`, including those inherited from
    /// bases defined earlier in the same file.
    pub fn methods_with_inherited<F>(&self, class: &PyClass, keep: F) -> BTreeSet<String>
    where
        F: Fn(&str) -> bool,
    {
        let by_name: HashMap<&str, &PyClass> =
            self.classes.iter().map(|c| (c.name.as_str(), c)).collect();
        let mut out = BTreeSet::new();
        let mut pending = vec![class];
        let mut seen = BTreeSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.name.as_str()) {
                continue;
            }
            out.extend(current.methods.iter().filter(|m| keep(m)).cloned());
            for base in &current.bases {
                if let Some(&parent) = by_name.get(base.as_str())
                    && parent.line < current.line
                {
                    pending.push(parent);
                }
            }
        }
        out
    }
}

/// A file that cannot be scanned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: unbalanced '{bracket}'")]
    UnbalancedBracket { line: usize, bracket: char },

    #[error("line {line}: expected ':' after {keyword} header")]
    MissingColon { line: usize, keyword: &'static str },
}

/// One logical line: physical lines joined across brackets and backslashes,
/// with comments removed and string literals collapsed to `""`.
#[derive(Debug)]
struct LogicalLine {
    line: usize,
    indent: usize,
    text: String,
}

/// Scan Python source into its module-level structure.
pub fn scan(source: &str) -> Result<PyModule, ScanError> {
    let lines = logical_lines(source)?;
    build_module(&lines)
}

#[derive(Clone)]
enum Owner {
    Module,
    /// Index path from `PyModule::classes` through `PyClass::children`.
    Class(Vec<usize>),
    /// Function bodies; nothing inside is collected.
    Opaque,
}

struct Frame {
    indent: usize,
    owner: Owner,
}

fn build_module(lines: &[LogicalLine]) -> Result<PyModule, ScanError> {
    let mut module = PyModule::default();
    let mut stack: Vec<Frame> = Vec::new();

    for l in lines {
        while stack.last().is_some_and(|f| f.indent >= l.indent) {
            stack.pop();
        }
        let owner = stack.last().map_or(Owner::Module, |f| f.owner.clone());
        let text = l.text.as_str();

        if text.starts_with('@') {
            continue;
        }

        if let Some((name, bases)) = parse_class(text, l.line)? {
            let class = PyClass {
                name,
                bases,
                methods: Vec::new(),
                children: Vec::new(),
                line: l.line,
            };
            let frame_owner = match owner {
                Owner::Module => {
                    module.classes.push(class);
                    Owner::Class(vec![module.classes.len() - 1])
                }
                Owner::Class(mut path) => match class_at(&mut module, &path) {
                    Some(parent) => {
                        parent.children.push(class);
                        path.push(parent.children.len() - 1);
                        Owner::Class(path)
                    }
                    None => Owner::Opaque,
                },
                Owner::Opaque => Owner::Opaque,
            };
            stack.push(Frame {
                indent: l.indent,
                owner: frame_owner,
            });
        } else if let Some(name) = parse_def(text, l.line)? {
            match &owner {
                Owner::Module => module.functions.push(name),
                Owner::Class(path) => {
                    if let Some(class) = class_at(&mut module, path) {
                        class.methods.push(name);
                    }
                }
                Owner::Opaque => {}
            }
            stack.push(Frame {
                indent: l.indent,
                owner: Owner::Opaque,
            });
        } else if BLOCK_RE.is_match(text) {
            stack.push(Frame {
                indent: l.indent,
                owner,
            });
        }
    }

    Ok(module)
}

fn class_at<'m>(module: &'m mut PyModule, path: &[usize]) -> Option<&'m mut PyClass> {
    let (&first, rest) = path.split_first()?;
    let mut class = module.classes.get_mut(first)?;
    for &idx in rest {
        class = class.children.get_mut(idx)?;
    }
    Some(class)
}

/// Parse a class header into its name and bases.
fn parse_class(text: &str, line: usize) -> Result<Option<(String, Vec<String>)>, ScanError> {
    let Some(caps) = CLASS_RE.captures(text) else {
        return Ok(None);
    };
    let name = caps[1].to_string();
    let mut rest = text[caps[0].len()..].trim_start();

    // PEP 695 type parameters
    if rest.starts_with('[') {
        let close = matching_close(rest).ok_or(ScanError::UnbalancedBracket { line, bracket: '[' })?;
        rest = rest[close + 1..].trim_start();
    }

    let mut bases = Vec::new();
    if rest.starts_with('(') {
        let close = matching_close(rest).ok_or(ScanError::UnbalancedBracket { line, bracket: '(' })?;
        bases = split_bases(&rest[1..close]);
        rest = rest[close + 1..].trim_start();
    }

    if !rest.starts_with(':') {
        return Err(ScanError::MissingColon {
            line,
            keyword: "class",
        });
    }
    Ok(Some((name, bases)))
}

/// Parse a function header into its name.
fn parse_def(text: &str, line: usize) -> Result<Option<String>, ScanError> {
    let Some(caps) = DEF_RE.captures(text) else {
        return Ok(None);
    };
    let name = caps[1].to_string();
    let open = caps[0].len() - 1;
    let close = matching_close(&text[open..])
        .ok_or(ScanError::UnbalancedBracket { line, bracket: '(' })?;
    if !text[open + close + 1..].contains(':') {
        return Err(ScanError::MissingColon {
            line,
            keyword: "def",
        });
    }
    Ok(Some(name))
}

/// Byte index of the bracket closing the one at the start of `s`.
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a base list on top-level commas, dropping keyword arguments.
fn split_bases(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && !p.contains('='))
        .map(|p| {
            let end = p.find(['[', '(']).unwrap_or(p.len());
            p[..end].split_whitespace().collect::<String>()
        })
        .collect()
}

fn is_closing_match(open: char, close: char) -> bool {
    matches!((open, close), ('(', ')') | ('[', ']') | ('{', '}'))
}

/// Split source into logical lines.
fn logical_lines(source: &str) -> Result<Vec<LogicalLine>, ScanError> {
    let mut lines = Vec::new();
    let mut text = String::new();
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1usize;
    let mut start_line = 1usize;
    let mut indent = 0usize;
    let mut at_line_start = true;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if at_line_start {
            match c {
                ' ' => {
                    indent += 1;
                    continue;
                }
                '\t' => {
                    indent = (indent / 8 + 1) * 8;
                    continue;
                }
                '\r' | '\x0c' => continue,
                '\n' => {
                    line += 1;
                    indent = 0;
                    continue;
                }
                '#' => {
                    skip_comment(&mut chars);
                    continue;
                }
                _ => {
                    at_line_start = false;
                    start_line = line;
                }
            }
        }

        match c {
            '#' => skip_comment(&mut chars),
            '\'' | '"' => {
                let mut look = chars.clone();
                let triple = look.next() == Some(c) && look.next() == Some(c);
                if triple {
                    chars.next();
                    chars.next();
                }
                skip_string(&mut chars, c, triple, &mut line)?;
                text.push_str("\"\"");
            }
            '\\' => {
                if chars.peek() == Some(&'\r') {
                    chars.next();
                }
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    line += 1;
                    text.push(' ');
                } else {
                    text.push(c);
                }
            }
            '(' | '[' | '{' => {
                open.push((c, line));
                text.push(c);
            }
            ')' | ']' | '}' => match open.pop() {
                Some((o, _)) if is_closing_match(o, c) => text.push(c),
                _ => return Err(ScanError::UnbalancedBracket { line, bracket: c }),
            },
            '\n' => {
                line += 1;
                if open.is_empty() {
                    flush(&mut lines, &mut text, start_line, indent);
                    at_line_start = true;
                    indent = 0;
                } else {
                    text.push(' ');
                }
            }
            '\r' => {}
            _ => text.push(c),
        }
    }

    if let Some(&(bracket, line)) = open.last() {
        return Err(ScanError::UnbalancedBracket { line, bracket });
    }
    flush(&mut lines, &mut text, start_line, indent);
    Ok(lines)
}

fn flush(lines: &mut Vec<LogicalLine>, text: &mut String, line: usize, indent: usize) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        lines.push(LogicalLine {
            line,
            indent,
            text: trimmed.to_string(),
        });
    }
    text.clear();
}

fn skip_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|&c| c != '\n') {
        chars.next();
    }
}

/// Consume a string literal body, opening quote(s) already consumed.
fn skip_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
    triple: bool,
    line: &mut usize,
) -> Result<(), ScanError> {
    let start = *line;
    let mut run = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                run = 0;
                if chars.next() == Some('\n') {
                    *line += 1;
                }
            }
            '\n' if !triple => return Err(ScanError::UnterminatedString { line: start }),
            '\n' => {
                run = 0;
                *line += 1;
            }
            c if c == quote => {
                run += 1;
                if !triple || run == 3 {
                    return Ok(());
                }
            }
            _ => run = 0,
        }
    }
    Err(ScanError::UnterminatedString { line: start })
}

#[cfg(test)]
#[path = "py_scan_tests.rs"]
mod tests;
