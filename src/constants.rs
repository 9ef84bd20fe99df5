//! Global constants used throughout the GCP codebase.
//!
//! File extensions, banner formatting and default file names live here so the
//! resolver, renderer and CLI agree on them.

/// Extensions a dependency may carry, in probing priority order.
///
/// When several candidates exist for the same base name the first one in this
/// list wins.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".js", ".ejs", ".hbs"];

/// Extensions rendered through the template collaborator before concatenation.
pub const TEMPLATE_EXTENSIONS: [&str; 2] = [".ejs", ".hbs"];

/// Width of the `=` rule in the banner printed above every concatenated file.
pub const BANNER_RULE_WIDTH: usize = 45;

/// Default configuration file name searched from the current directory upwards.
pub const CONFIG_FILE_NAME: &str = "gcp.toml";

/// Default JST namespace for compiled templates.
pub const DEFAULT_TEMPLATE_NAMESPACE: &str = "jst";

/// Default minifier executable.
pub const DEFAULT_MINIFIER: &str = "uglifyjs";

/// Environment variable selecting the build environment.
pub const ENV_VAR: &str = "GCP_ENV";

/// Fallback environment variable consulted when [`ENV_VAR`] is unset.
pub const FALLBACK_ENV_VAR: &str = "NODE_ENV";

/// Suffix of the concatenated artifact written by `gcp compile`.
pub const DIST_SUFFIX: &str = ".dist.js";

/// Suffix of the minified artifact written by `gcp compile`.
pub const MIN_SUFFIX: &str = ".min.js";

/// Entries containing this marker are never compiled by `gcp build`.
pub const SKIP_MARKER: &str = "_skip";
