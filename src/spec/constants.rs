//! Protocol constants and reply-code exception categories.

use std::collections::HashMap;

use crate::error::{CodecError, Result};

use super::definition::ConstantDefinition;

/// Failure scope implied by a reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExceptionCategory {
    /// Not an error code (or not a known one).
    #[default]
    Unknown,
    /// Hard error: the whole connection must be closed.
    Connection,
    /// Soft error: only the channel is closed.
    Channel,
}

/// A named protocol constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    /// Constant name as declared (e.g. `"NOT-FOUND"`).
    pub name: String,
    /// Constant value.
    pub value: u32,
    /// Error category, `Unknown` for plain constants.
    pub category: ExceptionCategory,
}

/// Constant table with a reply-code -> category index.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    constants: Vec<Constant>,
    by_name: HashMap<String, usize>,
    categories: HashMap<u16, ExceptionCategory>,
}

impl ConstantTable {
    /// Build the table from raw definitions.
    ///
    /// Accepts both `soft-error` and `soft error` spellings (older protocol
    /// documents use the latter).
    pub fn from_definitions(defs: &[ConstantDefinition]) -> Result<Self> {
        let mut table = Self::default();

        for def in defs {
            let category = match def.class.as_deref().map(|c| c.replace(' ', "-")) {
                None => ExceptionCategory::Unknown,
                Some(class) => match class.as_str() {
                    "" => ExceptionCategory::Unknown,
                    "soft-error" => ExceptionCategory::Channel,
                    "hard-error" => ExceptionCategory::Connection,
                    other => {
                        return Err(CodecError::Metadata(format!(
                            "Constant {} has unknown class '{}'",
                            def.name, other
                        )))
                    }
                },
            };

            if category != ExceptionCategory::Unknown {
                let code = u16::try_from(def.value).map_err(|_| {
                    CodecError::Metadata(format!(
                        "Error constant {} value {} does not fit a reply code",
                        def.name, def.value
                    ))
                })?;
                table.categories.insert(code, category);
            }

            if table.by_name.contains_key(&def.name) {
                return Err(CodecError::Metadata(format!(
                    "Duplicate constant {}",
                    def.name
                )));
            }
            table.by_name.insert(def.name.clone(), table.constants.len());
            table.constants.push(Constant {
                name: def.name.clone(),
                value: def.value,
                category,
            });
        }

        Ok(table)
    }

    /// Look up a constant value by name.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|&i| self.constants[i].value)
    }

    /// All constants, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    /// Failure scope for a reply code.
    #[inline]
    pub fn exception_category(&self, code: u16) -> ExceptionCategory {
        self.categories.get(&code).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str, value: u32, class: Option<&str>) -> ConstantDefinition {
        ConstantDefinition {
            name: name.to_string(),
            value,
            class: class.map(str::to_string),
        }
    }

    #[test]
    fn test_categories() {
        let table = ConstantTable::from_definitions(&[
            constant("FRAME-END", 206, None),
            constant("NOT-FOUND", 404, Some("soft-error")),
            constant("FRAME-ERROR", 501, Some("hard-error")),
        ])
        .unwrap();

        assert_eq!(table.exception_category(404), ExceptionCategory::Channel);
        assert_eq!(table.exception_category(501), ExceptionCategory::Connection);
        assert_eq!(table.exception_category(206), ExceptionCategory::Unknown);
        assert_eq!(table.exception_category(999), ExceptionCategory::Unknown);
        assert_eq!(table.get("FRAME-END"), Some(206));
        assert_eq!(table.get("MISSING"), None);
    }

    #[test]
    fn test_spaced_class_spelling() {
        let table = ConstantTable::from_definitions(&[
            constant("NO-ROUTE", 312, Some("soft error")),
            constant("INTERNAL-ERROR", 541, Some("hard error")),
        ])
        .unwrap();

        assert_eq!(table.exception_category(312), ExceptionCategory::Channel);
        assert_eq!(table.exception_category(541), ExceptionCategory::Connection);
    }

    #[test]
    fn test_unknown_class_rejected() {
        let result = ConstantTable::from_definitions(&[constant("X", 1, Some("warning"))]);
        assert!(result.unwrap_err().to_string().contains("unknown class"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = ConstantTable::from_definitions(&[
            constant("FRAME-END", 206, None),
            constant("FRAME-END", 207, None),
        ]);
        assert!(result.is_err());
    }
}
