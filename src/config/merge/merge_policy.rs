//! Merge rules: defaults, override order, conflict handling.

use crate::entity::default_type_relations;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Type relations are seeded key by key so a file that adds one content type
/// keeps the built-in ones.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    let mut builder = Config::builder()
        .set_default("router.default_from_list.type", "latest")?
        .set_default("router.default_from_list.id", "post")?
        .set_default("router.default_from_list.page", 1)?;
    for (kind, class) in default_type_relations() {
        builder = builder.set_default(
            format!("entities.type_relations.{}", kind),
            class.as_str(),
        )?;
    }
    Ok(builder)
}
