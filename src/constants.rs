/// Package name.
pub(crate) const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Package version, logged with every backup.
pub(crate) const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Default profile file name.
pub(crate) const CONFIG_NAME: &str = "config.toml";
