//! Server settings loaded via OrthoConfig.
//!
//! Values come from `LABFLOW_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use labflow::domain::{
    AdminSeed, DEFAULT_ROSTER_SIZE, DEFAULT_SESSION_TTL, MAX_ROSTER_SIZE, ProvisioningPlan,
};
use labflow::outbound::credentials::DEFAULT_PASSWORD_ROUNDS;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration values controlling the HTTP server and its storage.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LABFLOW")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Postgres URL. Without it the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Session lifetime in seconds.
    pub session_ttl_secs: Option<u64>,
    /// Patients generated per roster regeneration by default.
    pub roster_size: Option<usize>,
    /// PBKDF2 iterations for new password hashes.
    pub password_rounds: Option<u32>,
    /// Create the demo accounts on startup.
    #[ortho_config(default = false)]
    pub default_accounts: bool,
    /// Name of an admin account to ensure on startup.
    pub admin_name: Option<String>,
    /// Password for `admin_name`.
    pub admin_password: Option<String>,
}

/// Settings that cannot be turned into a running server.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("admin_name and admin_password must be set together")]
    IncompleteAdmin,
    #[error("roster_size {value} exceeds the {max} available patient ids")]
    RosterSize { value: usize, max: usize },
}

impl ServerSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl_secs
            .map_or(DEFAULT_SESSION_TTL, Duration::from_secs)
    }

    /// Default batch size, bounded by the patient id space.
    pub fn roster_size(&self) -> Result<usize, SettingsError> {
        match self.roster_size.unwrap_or(DEFAULT_ROSTER_SIZE) {
            value if value > MAX_ROSTER_SIZE => Err(SettingsError::RosterSize {
                value,
                max: MAX_ROSTER_SIZE,
            }),
            value => Ok(value),
        }
    }

    pub fn password_rounds(&self) -> u32 {
        self.password_rounds.unwrap_or(DEFAULT_PASSWORD_ROUNDS)
    }

    /// Accounts to ensure at startup.
    pub fn provisioning_plan(&self) -> Result<ProvisioningPlan, SettingsError> {
        let admin = match (&self.admin_name, &self.admin_password) {
            (Some(name), Some(password)) => Some(AdminSeed {
                name: name.clone(),
                password: Zeroizing::new(password.clone()),
            }),
            (None, None) => None,
            _ => return Err(SettingsError::IncompleteAdmin),
        };
        Ok(ProvisioningPlan {
            admin,
            default_accounts: self.default_accounts,
        })
    }
}

impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("roster_size", &self.roster_size)
            .field("password_rounds", &self.password_rounds)
            .field("default_accounts", &self.default_accounts)
            .field("admin_name", &self.admin_name)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Settings parsing coverage.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 8] = [
        "LABFLOW_BIND_ADDR",
        "LABFLOW_DATABASE_URL",
        "LABFLOW_SESSION_TTL_SECS",
        "LABFLOW_ROSTER_SIZE",
        "LABFLOW_PASSWORD_ROUNDS",
        "LABFLOW_DEFAULT_ACCOUNTS",
        "LABFLOW_ADMIN_NAME",
        "LABFLOW_ADMIN_PASSWORD",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("labflow")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> [(&'static str, Option<String>); 8] {
        KEYS.map(|key| {
            let value = overrides
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned());
            (key, value)
        })
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.session_ttl(), DEFAULT_SESSION_TTL);
        assert_eq!(settings.roster_size().expect("default fits"), DEFAULT_ROSTER_SIZE);
        assert_eq!(settings.password_rounds(), DEFAULT_PASSWORD_ROUNDS);
        let plan = settings.provisioning_plan().expect("no admin is fine");
        assert!(plan.admin.is_none());
        assert!(!plan.default_accounts);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("LABFLOW_BIND_ADDR", "127.0.0.1:9000"),
            ("LABFLOW_SESSION_TTL_SECS", "60"),
            ("LABFLOW_ROSTER_SIZE", "4"),
            ("LABFLOW_DEFAULT_ACCOUNTS", "true"),
            ("LABFLOW_ADMIN_NAME", "root"),
            ("LABFLOW_ADMIN_PASSWORD", "hunter22"),
        ]));

        let settings = load();
        let plan = settings.provisioning_plan().expect("complete admin");

        assert_eq!(settings.bind_addr().expect("parses").port(), 9000);
        assert_eq!(settings.session_ttl(), Duration::from_secs(60));
        assert_eq!(settings.roster_size().expect("fits"), 4);
        assert!(plan.default_accounts);
        let admin = plan.admin.expect("admin configured");
        assert_eq!(admin.name, "root");
        assert_eq!(admin.password.as_str(), "hunter22");
        assert!(!format!("{settings:?}").contains("hunter22"));
    }

    #[rstest]
    fn half_configured_admins_are_rejected() {
        let _guard = lock_env(env_with(&[("LABFLOW_ADMIN_NAME", "root")]));

        assert!(matches!(
            load().provisioning_plan(),
            Err(SettingsError::IncompleteAdmin)
        ));
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let _guard = lock_env(env_with(&[("LABFLOW_BIND_ADDR", "localhost")]));

        assert!(matches!(
            load().bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn roster_sizes_beyond_the_id_space_are_rejected() {
        let _guard = lock_env(env_with(&[("LABFLOW_ROSTER_SIZE", "91")]));

        assert!(matches!(
            load().roster_size(),
            Err(SettingsError::RosterSize { value: 91, max: 90 })
        ));
    }
}
