//! Environment source: `POWERPIPE_<KEY>` variables.

use std::collections::HashMap;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

use crate::config::ENV_PREFIX;

/// Add `POWERPIPE_*` variables. `vars` replaces the process environment
/// when given.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<HashMap<String, String>>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(Environment::with_prefix(ENV_PREFIX).source(vars))
}
