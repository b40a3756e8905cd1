//! Settings parsing and defaults merging.

use contracts::{AppSettings, ContractError};
use toml::{Table, Value};

/// Parse TOML text into a raw table
///
/// Empty input yields an empty table.
pub fn parse_table(content: &str) -> Result<Table, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Fill sections and keys missing from `user` with values from `defaults`
///
/// Existing user values are never overwritten. Returns the number of
/// entries that were added.
pub fn merge_defaults(user: &mut Table, defaults: &Table) -> usize {
    let mut added = 0;

    for (section, default_value) in defaults {
        match user.get_mut(section) {
            None => {
                user.insert(section.clone(), default_value.clone());
                added += 1;
            }
            Some(Value::Table(user_section)) => {
                if let Value::Table(default_section) = default_value {
                    for (key, value) in default_section {
                        if !user_section.contains_key(key) {
                            user_section.insert(key.clone(), value.clone());
                            added += 1;
                        }
                    }
                }
            }
            // A user scalar where defaults have a section is left for validation to report
            Some(_) => {}
        }
    }

    added
}

/// Convert a merged table into typed settings
pub fn into_settings(table: Table) -> Result<AppSettings, ContractError> {
    Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ContractError::ConfigParse {
            message: format!("settings shape error: {e}"),
            source: Some(Box::new(e)),
        })
}
