// Build-time identity

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml); also the binary name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
