/// Class attribute holding the [`crate::registry::DeclarationRegistry`].
pub const DECLARED_CLASSES_ATTR: &str = "__declared_dataclasses__";

/// Class attribute holding the resolved [`crate::synth::FieldLayout`].
pub const FIELDS_ATTR: &str = "__dataclass_fields__";

/// Class attribute holding the [`crate::options::AugmentationOptions`] a class was built with.
pub const PARAMS_ATTR: &str = "__dataclass_params__";

pub const MATCH_ARGS_ATTR: &str = "__match_args__";
pub const SLOTS_ATTR: &str = "__slots__";
pub const WEAKREF_SLOT: &str = "__weakref__";
pub const HASH_ATTR: &str = "__hash__";
pub const EQ_ATTR: &str = "__eq__";

/// Name of the environment variable containing the path to the configuration file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/augcore/config.toml` or `$HOME/.config/augcore/config.toml`
///  (2) on Windows: `%APPDATA%\augcore\config.toml`
pub const ENV_CONFIG_PATH: &str = "AUGCORE_CONFIG_PATH";
