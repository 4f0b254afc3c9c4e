#![deny(warnings)]
pub mod model;
pub mod replay;

/// Identity stamped into generated reports.
pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "igt-analyser"
    }

    pub const fn codename() -> &'static str {
        "Deck Replay"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// `name version (codename)`, as printed in summaries and `--version`.
    pub fn banner() -> String {
        format!("{} {} ({})", Self::name(), Self::version(), Self::codename())
    }
}
