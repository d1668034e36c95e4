//! LORIS configuration settings
//!
//! Values live in `Config`, keyed through `ConfigSettings.Name`.

use crate::Result;
use sqlx::{Any, Executor};

/// Config setting holding the BIDS/data root directory
pub const DATA_DIR_SETTING: &str = "dataDirBasepath";

/// Get a configuration value by setting name
///
/// **Returns:** Some(value) if set, None if the setting or its value is absent
pub async fn get_config<'e, E>(executor: E, name: &str) -> Result<Option<String>>
where
    E: Executor<'e, Database = Any>,
{
    // Config.Value is TEXT, which MySQL reports as a blob type; the Any
    // driver only decodes String from text columns
    let value: Option<Option<String>> = sqlx::query_scalar(
        "SELECT CAST(c.Value AS CHAR) FROM Config c \
         JOIN ConfigSettings cs ON (c.ConfigID = cs.ID) \
         WHERE cs.Name = ?",
    )
    .bind(name)
    .fetch_optional(executor)
    .await?;

    let value = value.flatten().filter(|v| !v.trim().is_empty());
    tracing::debug!(setting = name, found = value.is_some(), "Config lookup");

    Ok(value)
}
