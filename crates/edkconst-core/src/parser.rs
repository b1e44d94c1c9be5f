//! Line-oriented extraction of constants from C header text.
//!
//! The parser is a small state machine that recognises two shapes of declaration:
//!
//! - `#define NAME LITERAL`, optionally preceded by a `//!` comment line whose text becomes
//!   the description
//! - `typedef enum TYPENAME { ... } TYPENAME;` blocks, whose members are numbered with an
//!   implicit counter, may carry explicit `= LITERAL` values, or may be the bitwise OR of
//!   previously declared members (continued onto at most one further line)
//!
//! Anything else is inert. It relies on the consistent formatting of vendor SDK headers
//! and makes no attempt to evaluate the preprocessor.

use crate::error::{Error, Result};
use crate::literal::parse_literal;
use crate::table::{Constant, ConstantTable};
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Directive that introduces a define-derived constant
const DEFINE_MARKER: &str = "#define";

/// Prefix of a line that opens an enumeration group
const GROUP_MARKER: &str = "typedef enum";

/// Configuration for header parsing
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Prefix marking a documentation comment that describes the next `#define`
    pub comment_marker: String,
    /// Description stored for defines without a documentation comment
    pub placeholder_description: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            comment_marker: "//!".to_string(),
            placeholder_description: "No description available".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new parser config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the documentation comment prefix
    pub fn comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }

    /// Sets the description used when no comment precedes a define
    pub fn placeholder_description(mut self, description: impl Into<String>) -> Self {
        self.placeholder_description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InGroup,
}

/// Transient state for the traversal of a single source
#[derive(Debug)]
struct ParseState {
    mode: Mode,
    /// Type name of the enclosing group
    group: String,
    /// Value the next plain member receives
    counter: i64,
    /// Member whose bitwise-OR expression continues on the next line
    pending_or: Option<String>,
    /// Previous physical line, verbatim
    previous_line: String,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            group: String::new(),
            counter: 0,
            pending_or: None,
            previous_line: String::new(),
        }
    }
}

/// Parses one header source into a [`ConstantTable`]
///
/// A parser is created per source; state never leaks from one source into the next.
///
/// ```
/// use edkconst_core::{ConstantTable, HeaderParser, ParserConfig};
///
/// let mut table = ConstantTable::new();
/// let mut parser = HeaderParser::new("inline.h", ParserConfig::default());
/// parser.parse_line(&mut table, "//! Operation completed successfully")?;
/// parser.parse_line(&mut table, "#define EDK_OK 0x0000")?;
///
/// assert_eq!(table.get("EDK_OK")?, 0);
/// assert_eq!(parser.finish(), 1);
/// # Ok::<(), edkconst_core::Error>(())
/// ```
#[derive(Debug)]
pub struct HeaderParser {
    config: ParserConfig,
    state: ParseState,
    source_name: String,
    line_number: usize,
    committed: usize,
}

impl HeaderParser {
    /// Creates a parser for the named source
    pub fn new(source_name: impl Into<String>, config: ParserConfig) -> Self {
        Self {
            config,
            state: ParseState::default(),
            source_name: source_name.into(),
            line_number: 0,
            committed: 0,
        }
    }

    /// Name of the source this parser reads
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Parse every line of `reader`, returning the number of constants committed.
    ///
    /// Lines are decoded lossily so that headers in legacy 8-bit encodings still parse.
    pub fn parse_reader<R: BufRead>(
        mut self,
        table: &mut ConstantTable,
        reader: R,
    ) -> Result<usize> {
        for line in reader.split(b'\n') {
            let bytes = line.map_err(|e| Error::file_read(&self.source_name, e))?;
            let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes);
            self.parse_line(table, &String::from_utf8_lossy(bytes))?;
        }
        Ok(self.finish())
    }

    /// Consume one physical line (without its terminator)
    pub fn parse_line(&mut self, table: &mut ConstantTable, line: &str) -> Result<()> {
        self.line_number += 1;
        let result = self.classify(table, line);
        self.state.previous_line.clear();
        self.state.previous_line.push_str(line);
        result
    }

    /// End the traversal, returning the number of constants committed
    pub fn finish(&self) -> usize {
        if self.state.mode == Mode::InGroup {
            warn!(
                "{}: end of input inside enum '{}'",
                self.source_name, self.state.group
            );
        }
        if let Some(target) = &self.state.pending_or {
            warn!(
                "{}: end of input before continuation of '{}'",
                self.source_name, target
            );
        }
        debug!(
            "Parsed {}: {} constants from {} lines",
            self.source_name, self.committed, self.line_number
        );
        self.committed
    }

    fn classify(&mut self, table: &mut ConstantTable, line: &str) -> Result<()> {
        match self.state.mode {
            Mode::Normal => {
                if line.starts_with(DEFINE_MARKER) {
                    self.define(table, line)
                } else if line.trim_start().starts_with(GROUP_MARKER) {
                    self.open_group(line)
                } else {
                    Ok(())
                }
            }
            Mode::InGroup => {
                if let Some(target) = self.state.pending_or.take() {
                    self.continue_or(table, line, target)
                } else if line.trim_start().starts_with('}') {
                    self.state.mode = Mode::Normal;
                    self.state.counter = 0;
                    Ok(())
                } else {
                    self.members(table, line)
                }
            }
        }
    }

    fn define(&mut self, table: &mut ConstantTable, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [_, name, literal] => match parse_literal(literal) {
                Ok(value) => {
                    let description = self.comment_description();
                    self.commit(table, Constant::define(*name, value, description));
                    Ok(())
                }
                Err(e) if e.is_recoverable() => {
                    debug!("{}: skipping non-integer define {}: {}", self.source_name, name, e);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            [_, name] => {
                trace!("{}: skipping valueless define {}", self.source_name, name);
                Ok(())
            }
            _ => Err(self.failure(line, "unexpected #define arity")),
        }
    }

    fn comment_description(&self) -> String {
        self.state
            .previous_line
            .strip_prefix(self.config.comment_marker.as_str())
            .map(|comment| comment.trim().to_string())
            .unwrap_or_else(|| self.config.placeholder_description.clone())
    }

    fn open_group(&mut self, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(self.failure(line, "unexpected enum formatting"));
        }

        let name = match tokens[2].find('{') {
            Some(brace) => &tokens[2][..brace],
            None => tokens[2],
        };
        if name.is_empty() {
            return Err(self.failure(line, "enum without a type name"));
        }

        trace!("{}: entering enum {}", self.source_name, name);
        self.state.mode = Mode::InGroup;
        self.state.group = name.to_string();
        self.state.counter = 0;
        Ok(())
    }

    fn members(&mut self, table: &mut ConstantTable, line: &str) -> Result<()> {
        let (body, closes) = match line.find('}') {
            Some(brace) => (&line[..brace], true),
            None => (line, false),
        };
        let trimmed = body.trim_start();
        let body = trimmed.strip_prefix('{').unwrap_or(trimmed);

        for declaration in body.split(',') {
            if self.state.pending_or.is_some() && !declaration.trim().is_empty() {
                return Err(self.failure(line, "bitwise-OR continuation must end the line"));
            }
            self.member(table, line, declaration)?;
        }

        if closes {
            if self.state.pending_or.is_some() {
                return Err(self.failure(line, "bitwise-OR continuation after closing brace"));
            }
            self.state.mode = Mode::Normal;
        }
        Ok(())
    }

    fn member(&mut self, table: &mut ConstantTable, line: &str, declaration: &str) -> Result<()> {
        let tokens: Vec<&str> = declaration.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Ok(()),
            [name] => {
                let value = self.state.counter;
                self.commit_member(table, name, value);
                self.state.counter = value.wrapping_add(1);
                Ok(())
            }
            [name, "=", rest @ ..] if !rest.is_empty() => {
                let expression = rest.concat();
                if expression.contains('|') {
                    self.composite(table, line, name, &expression)
                } else if let [literal] = rest {
                    let value =
                        parse_literal(literal).map_err(|e| self.failure(line, e.to_string()))?;
                    self.commit_member(table, name, value);
                    self.state.counter = value.wrapping_add(1);
                    Ok(())
                } else {
                    Err(self.failure(line, "unexpected enum member"))
                }
            }
            _ => Err(self.failure(line, "unexpected enum member")),
        }
    }

    fn composite(
        &mut self,
        table: &mut ConstantTable,
        line: &str,
        name: &str,
        expression: &str,
    ) -> Result<()> {
        let segments: Vec<&str> = expression.split('|').collect();
        let (operands, continues) = match segments.split_last() {
            Some((last, init)) if last.is_empty() => (init, true),
            _ => (segments.as_slice(), false),
        };

        let mut value = 0;
        for operand in operands {
            value |= self.operand(table, line, operand)?;
        }
        self.commit_member(table, name, value);

        if continues {
            trace!("{}: {} continues on the next line", self.source_name, name);
            self.state.pending_or = Some(name.to_string());
        }
        Ok(())
    }

    fn continue_or(&mut self, table: &mut ConstantTable, line: &str, target: String) -> Result<()> {
        let segments: Vec<&str> = line
            .split('|')
            .map(|segment| segment.trim().trim_end_matches(',').trim_end())
            .collect();
        if segments.len() > 1 && segments.last().is_some_and(|last| last.is_empty()) {
            return Err(Error::UnsupportedContinuation {
                source_name: self.source_name.clone(),
                line_number: self.line_number,
                line: line.to_string(),
            });
        }

        let mut value = self.operand(table, line, &target)?;
        for operand in segments {
            value |= self.operand(table, line, operand)?;
        }

        trace!("{}: {} = {:#x} (continued)", self.source_name, target, value);
        table.set_constant(Constant::member(target, value, self.state.group.clone()));
        Ok(())
    }

    fn operand(&self, table: &ConstantTable, line: &str, operand: &str) -> Result<i64> {
        if operand.is_empty() {
            return Err(self.failure(line, "empty bitwise-OR operand"));
        }
        table
            .get(operand)
            .map_err(|_| self.failure(line, format!("unknown operand '{operand}'")))
    }

    fn commit_member(&mut self, table: &mut ConstantTable, name: &str, value: i64) {
        let constant = Constant::member(name, value, self.state.group.clone());
        self.commit(table, constant);
    }

    fn commit(&mut self, table: &mut ConstantTable, constant: Constant) {
        trace!(
            "{}: {} = {:#x} \"{}\"",
            self.source_name,
            constant.name,
            constant.value,
            constant.description
        );
        table.set_constant(constant);
        self.committed += 1;
    }

    fn failure(&self, line: &str, reason: impl Into<String>) -> Error {
        Error::ParseFailure {
            source_name: self.source_name.clone(),
            line_number: self.line_number,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
