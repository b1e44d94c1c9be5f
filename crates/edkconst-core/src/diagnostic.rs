//! Diagnostics for status codes returned by the native SDK.
//!
//! The binding layer receives bare integers back from the vendor library. [`StatusError`]
//! pairs such a code with what the caller was doing and renders it through a
//! [`ConstantTable`], e.g. `EE_EngineConnect failed: code 0x300 (EDK_COMPOSER_UNAVAILABLE "...")`.

use crate::error::{Error, Result};
use crate::table::ConstantTable;

/// Fallback shown when no constant carries the code
const UNKNOWN_CODE: &str = "unknown code";

/// An unsuccessful status code and the operation that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    /// What the caller was doing
    pub context: String,
    /// Raw status code
    pub code: i64,
    /// Restrict the description to members of this enum type
    pub group: Option<String>,
}

impl StatusError {
    /// Creates a new status error
    pub fn new(context: impl Into<String>, code: i64) -> Self {
        Self {
            context: context.into(),
            code,
            group: None,
        }
    }

    /// Only describe the code with members of `group`
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Render the diagnostic message against `table`
    pub fn render(&self, table: &ConstantTable) -> String {
        let description = table
            .describe(self.code, self.group.as_deref())
            .unwrap_or_else(|| UNKNOWN_CODE.to_string());
        format!("{}: code {:#x} ({})", self.context, self.code, description)
    }

    /// Convert into a crate error with the message rendered against `table`
    pub fn into_error(self, table: &ConstantTable) -> Error {
        Error::Status {
            message: self.render(table),
            code: self.code,
        }
    }
}

impl ConstantTable {
    /// Check a status code against the value of the success constant `ok_name`.
    ///
    /// ```
    /// use edkconst_core::ConstantTable;
    ///
    /// let mut table = ConstantTable::new();
    /// table.add_str("edkErrorCode.h", "#define EDK_OK 0x0000\n//! Invalid parameter\n#define EDK_INVALID_PARAMETER 0x0302\n")?;
    ///
    /// assert!(table.check(0, "EDK_OK", "EE_EngineConnect").is_ok());
    /// let err = table.check(0x302, "EDK_OK", "EE_EngineConnect").unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     r#"EE_EngineConnect: code 0x302 (EDK_INVALID_PARAMETER "Invalid parameter")"#
    /// );
    /// # Ok::<(), edkconst_core::Error>(())
    /// ```
    pub fn check(&self, code: i64, ok_name: &str, context: impl Into<String>) -> Result<()> {
        if code == self.get(ok_name)? {
            Ok(())
        } else {
            Err(StatusError::new(context, code).into_error(self))
        }
    }
}
