//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let migration = &config.migration;

    if !migration.migrate_all_tables && migration.whitelist.is_empty() {
        return Err(MigrateError::Config(
            "migration.whitelist must list at least one table unless migrate_all_tables is set"
                .into(),
        ));
    }

    if migration.bare_numeric_type.trim().is_empty() {
        return Err(MigrateError::Config(
            "migration.bare_numeric_type cannot be empty".into(),
        ));
    }

    if let Some((source, _)) = migration
        .type_mapping
        .iter()
        .find(|(_, target)| target.trim().is_empty())
    {
        return Err(MigrateError::Config(format!(
            "migration.type_mapping entry '{}' has an empty target type",
            source
        )));
    }

    let output = &config.output;
    if output.base_dir.trim().is_empty() {
        return Err(MigrateError::Config("output.base_dir is required".into()));
    }

    if output.create_subfolders {
        let folders = [
            ("tables_create_dir", &output.tables_create_dir),
            ("tables_inserts_dir", &output.tables_inserts_dir),
            ("sequences_dir", &output.sequences_dir),
            ("indexes_dir", &output.indexes_dir),
            ("constraints_dir", &output.constraints_dir),
            ("views_dir", &output.views_dir),
            ("routines_dir", &output.routines_dir),
        ];
        for (key, value) in folders {
            if value.trim().is_empty() {
                return Err(MigrateError::Config(format!(
                    "output.{} cannot be empty when create_subfolders is set",
                    key
                )));
            }
        }
    }

    Ok(())
}
