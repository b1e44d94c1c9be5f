//! The constant table and its queries.
//!
//! [`ConstantTable`] keeps every constant in insertion order. Re-inserting a name replaces
//! its value and description and moves it to the end, so [`ConstantTable::describe`]
//! reports collisions in the order the current definitions were made.

use crate::error::{Error, Result};
use crate::parser::{HeaderParser, ParserConfig};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;
use tracing::debug;

/// Header sources of the Emotiv SDK, in the order they are conventionally ingested
pub const DEFAULT_SOURCES: [&str; 3] = ["edkErrorCode.h", "edk.h", "EmoStateDLL.h"];

/// Where a constant was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// `#define NAME LITERAL`; the description is free comment text
    Define,
    /// Member of a `typedef enum`; the description is the enum's type name
    Enum,
}

/// A named integer constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    /// Constant name
    pub name: String,
    /// Integer value
    pub value: i64,
    /// Comment text for defines, group type name for enum members
    pub description: String,
    /// Kind of declaration
    pub origin: Origin,
}

impl Constant {
    /// Creates a define-derived constant
    pub fn define(name: impl Into<String>, value: i64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: description.into(),
            origin: Origin::Define,
        }
    }

    /// Creates an enum member belonging to `group`
    pub fn member(name: impl Into<String>, value: i64, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: group.into(),
            origin: Origin::Enum,
        }
    }
}

/// Insertion-ordered mapping of constant names to values and descriptions
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    entries: Vec<Constant>,
    index: HashMap<String, usize>,
    config: ParserConfig,
}

impl ConstantTable {
    /// Creates an empty table that parses with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table that parses sources with `config`
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builds a table from header files, ingested in the given order
    pub fn from_sources<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut table = Self::new();
        for path in paths {
            table.add(path)?;
        }
        Ok(table)
    }

    /// Builds a table from the [`DEFAULT_SOURCES`] found in `dir`
    pub fn from_include_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::from_sources(DEFAULT_SOURCES.iter().map(|name| dir.join(name)))
    }

    /// Parse a header file into the table.
    ///
    /// Returns the number of constants committed from this source. On a fatal parse error
    /// the constants committed before the offending line remain in the table.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        debug!("Adding constants from {}", path.display());
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        self.add_reader(path.display().to_string(), BufReader::new(file))
    }

    /// Parse header text from any buffered reader
    pub fn add_reader(
        &mut self,
        source_name: impl Into<String>,
        reader: impl BufRead,
    ) -> Result<usize> {
        let parser = HeaderParser::new(source_name, self.config.clone());
        parser.parse_reader(self, reader)
    }

    /// Parse header text held in memory
    pub fn add_str(&mut self, source_name: impl Into<String>, text: &str) -> Result<usize> {
        self.add_reader(source_name, text.as_bytes())
    }

    /// Insert or overwrite a define-derived constant
    pub fn set(&mut self, name: impl Into<String>, value: i64, description: impl Into<String>) {
        self.set_constant(Constant::define(name, value, description));
    }

    /// Insert or overwrite a constant, making it the most recent entry
    pub fn set_constant(&mut self, constant: Constant) {
        if let Some(position) = self.index.remove(&constant.name) {
            self.entries.remove(position);
            for (offset, entry) in self.entries[position..].iter().enumerate() {
                self.index.insert(entry.name.clone(), position + offset);
            }
        }
        self.index.insert(constant.name.clone(), self.entries.len());
        self.entries.push(constant);
    }

    /// Value of the named constant
    pub fn get(&self, name: &str) -> Result<i64> {
        self.lookup(name)
            .map(|constant| constant.value)
            .ok_or_else(|| Error::not_found(name))
    }

    /// The named constant, if registered
    pub fn lookup(&self, name: &str) -> Option<&Constant> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    /// Description of the named constant, if registered
    pub fn description(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|constant| constant.description.as_str())
    }

    /// Returns true if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered constants
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no constants are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over constants in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.entries.iter()
    }

    /// Distinct enum type names, in order of first appearance
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for constant in self.entries.iter().filter(|c| c.origin == Origin::Enum) {
            if !groups.contains(&constant.description.as_str()) {
                groups.push(&constant.description);
            }
        }
        groups
    }

    /// Human-readable names for `value`.
    ///
    /// Every constant holding `value` (and, with a filter, whose description equals
    /// `group_filter` exactly) is rendered as `NAME "description"`; matches are joined with
    /// `, or ` in insertion order. Returns `None` when nothing matches.
    ///
    /// ```
    /// use edkconst_core::ConstantTable;
    ///
    /// let mut table = ConstantTable::new();
    /// table.add_str("edk.h", "//! Operation completed successfully\n#define EDK_OK 0x0000\n")?;
    /// table.add_str("events.h", "typedef enum EE_Event_enum{\n  EE_UnknownEvent = 0\n}EE_Event_enum;\n")?;
    ///
    /// assert_eq!(
    ///     table.describe(0, None).as_deref(),
    ///     Some(r#"EDK_OK "Operation completed successfully", or EE_UnknownEvent "EE_Event_enum""#)
    /// );
    /// assert_eq!(
    ///     table.describe(0, Some("EE_Event_enum")).as_deref(),
    ///     Some(r#"EE_UnknownEvent "EE_Event_enum""#)
    /// );
    /// # Ok::<(), edkconst_core::Error>(())
    /// ```
    pub fn describe(&self, value: i64, group_filter: Option<&str>) -> Option<String> {
        let matches: Vec<String> = self
            .entries
            .iter()
            .filter(|constant| constant.value == value)
            .filter(|constant| group_filter.map_or(true, |group| constant.description == group))
            .map(|constant| format!("{} \"{}\"", constant.name, constant.description))
            .collect();

        if matches.is_empty() {
            None
        } else {
            Some(matches.join(", or "))
        }
    }
}

impl Index<&str> for ConstantTable {
    type Output = i64;

    /// Panics if `name` is not registered
    fn index(&self, name: &str) -> &i64 {
        match self.lookup(name) {
            Some(constant) => &constant.value,
            None => panic!("constant '{name}' not found"),
        }
    }
}

impl<'a> IntoIterator for &'a ConstantTable {
    type Item = &'a Constant;
    type IntoIter = std::slice::Iter<'a, Constant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const SCENARIO: &str = "\
//! Operation completed successfully
#define EDK_OK 0x0000
typedef enum EE_Event_enum{
  EE_UnknownEvent = 0,
  EE_EmoStateUpdated,
  EE_UserAdded
}EE_Event_enum;
";

    #[test]
    fn test_scenario() {
        let mut table = ConstantTable::new();
        table.add_str("scenario.h", SCENARIO).unwrap();

        assert_eq!(table.get("EDK_OK").unwrap(), 0);
        assert_eq!(table.get("EE_UserAdded").unwrap(), 2);
        assert_eq!(
            table.describe(0, None).unwrap(),
            r#"EDK_OK "Operation completed successfully", or EE_UnknownEvent "EE_Event_enum""#
        );
        assert_eq!(
            table.describe(0, Some("EE_Event_enum")).unwrap(),
            r#"EE_UnknownEvent "EE_Event_enum""#
        );
    }

    #[test]
    fn test_get_missing_name() {
        let table = ConstantTable::new();
        assert!(matches!(
            table.get("EDK_OK"),
            Err(Error::NotFound { name }) if name == "EDK_OK"
        ));
    }

    #[test]
    fn test_describe_no_match() {
        let mut table = ConstantTable::new();
        table.set("A", 1, "first");
        assert_eq!(table.describe(2, None), None);
        assert_eq!(table.describe(1, Some("SomeGroup")), None);
    }

    #[test]
    fn test_describe_filters_by_group() {
        let mut table = ConstantTable::new();
        table.set_constant(Constant::member("ED_AF3", 3, "EE_DataChannels_enum"));
        table.set_constant(Constant::member("EE_UserRemoved", 3, "EE_Event_enum"));
        assert_eq!(
            table.describe(3, Some("EE_Event_enum")).unwrap(),
            r#"EE_UserRemoved "EE_Event_enum""#
        );
    }

    #[test]
    fn test_overwrite_moves_to_end() {
        let mut table = ConstantTable::new();
        table.set("A", 1, "a");
        table.set("B", 1, "b");
        table.set("C", 2, "c");
        table.set("A", 1, "again");

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.describe(1, None).unwrap(),
            r#"B "b", or A "again""#
        );
        let names: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(table.get("C").unwrap(), 2);
        assert_eq!(table.get("A").unwrap(), 1);
    }

    #[test]
    fn test_later_source_wins() {
        let mut table = ConstantTable::new();
        table.add_str("first.h", "#define EDK_OK 0\n").unwrap();
        table.add_str("second.h", "//! Redefined\n#define EDK_OK 7\n").unwrap();

        assert_eq!(table.get("EDK_OK").unwrap(), 7);
        assert_eq!(table.describe(0, None), None);
        assert_eq!(table.describe(7, None).unwrap(), r#"EDK_OK "Redefined""#);
    }

    #[test]
    fn test_groups() {
        let mut table = ConstantTable::new();
        table
            .add_str("t.h", "#define X 1\ntypedef enum A {\n A1, A2\n} A;\ntypedef enum B {\n B1\n} B;\n")
            .unwrap();
        assert_eq!(table.groups(), vec!["A", "B"]);
        assert_eq!(table["A2"], 1);
        assert_eq!(table.lookup("X").map(|c| c.origin), Some(Origin::Define));
        assert_eq!(table.lookup("B1").map(|c| c.origin), Some(Origin::Enum));
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn test_index_missing_panics() {
        let table = ConstantTable::new();
        let _value: i64 = table["MISSING"];
    }

    #[test]
    fn test_add_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("edk.h");
        fs::write(&path, SCENARIO).unwrap();

        let mut table = ConstantTable::new();
        assert_eq!(table.add(&path).unwrap(), 4);
        assert_eq!(table.get("EE_EmoStateUpdated").unwrap(), 1);
    }

    #[test]
    fn test_add_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = ConstantTable::new();
        let err = table.add(temp_dir.path().join("missing.h")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_from_include_dir_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("edkErrorCode.h"),
            "//! Operation completed successfully\n#define EDK_OK 0x0000\n#define SHARED 1\n",
        )
        .unwrap();
        fs::write(temp_dir.path().join("edk.h"), "#define SHARED 2\n").unwrap();
        fs::write(
            temp_dir.path().join("EmoStateDLL.h"),
            "typedef enum EE_EEG_ContactQuality_enum {\n  EEG_CQ_NO_SIGNAL, EEG_CQ_VERY_BAD\n} EE_EEG_ContactQuality_t;\n",
        )
        .unwrap();

        let table = ConstantTable::from_include_dir(temp_dir.path()).unwrap();
        assert_eq!(table.get("SHARED").unwrap(), 2);
        assert_eq!(
            table.describe(0, None).unwrap(),
            r#"EDK_OK "Operation completed successfully", or EEG_CQ_NO_SIGNAL "EE_EEG_ContactQuality_enum""#
        );
    }
}
