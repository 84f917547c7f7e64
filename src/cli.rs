use std::fmt;

use clap::Parser;

#[derive(Parser, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "batscan.toml")]
    pub config: String,

    /// Run one scripted session without GUI (headless)
    #[arg(long, default_value_t = false)]
    pub nogui: bool,

    /// Username for the headless login
    #[arg(long, default_value = "operator")]
    pub user: String,

    /// Password for the headless login
    #[arg(long, default_value = "operator", hide_default_value = true)]
    pub password: String,

    /// Battery serial number for headless scans
    #[arg(long, default_value = "")]
    pub serial: String,

    /// Number of scans to acquire and save in headless mode
    #[arg(long, default_value_t = 1)]
    pub scans: usize,

    /// Directory for exported heat-map PNGs in headless mode
    #[arg(long, default_value = "target/batscan")]
    pub out: String,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("config", &self.config)
            .field("nogui", &self.nogui)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("serial", &self.serial)
            .field("scans", &self.scans)
            .field("out", &self.out)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let args = Args::parse_from(["batscan", "--nogui", "--user", "ops", "--password", "s3cret-pw"]);
        assert_eq!(args.password, "s3cret-pw");
        let shown = format!("{args:?}");
        assert!(!shown.contains("s3cret-pw"), "{shown}");
        assert!(shown.contains("<redacted>"));
        assert!(shown.contains("\"ops\""));
    }
}
