//! Store connection settings, read once from the environment at startup.
//!
//! | variable               | required | default     |
//! |------------------------|----------|-------------|
//! | `SNOWALERT_ACCOUNT`    | yes      |             |
//! | `UPDATE_WAREHOUSE`     | yes      |             |
//! | `UPDATE_ROLE`          | yes      |             |
//! | `UPDATE_USER`          | unless a user is passed explicitly | |
//! | `SNOWALERT_TOKEN`      | yes      |             |
//! | `SNOWALERT_TOKEN_TYPE` | no       | `OAUTH`     |
//! | `SNOWALERT_DATABASE`   | no       | `snowalert` |
//! | `SNOWALERT_SCHEMA`     | no       | `public`    |
//! | `SNOWALERT_API_URL`    | no       | `https://<account>.snowflakecomputing.com` |

use std::fmt;
use std::str::FromStr;

use alertsync_core::SpecKind;

use crate::error::ConfigError;

pub const ENV_ACCOUNT: &str = "SNOWALERT_ACCOUNT";
pub const ENV_WAREHOUSE: &str = "UPDATE_WAREHOUSE";
pub const ENV_ROLE: &str = "UPDATE_ROLE";
pub const ENV_USER: &str = "UPDATE_USER";
pub const ENV_TOKEN: &str = "SNOWALERT_TOKEN";
pub const ENV_TOKEN_TYPE: &str = "SNOWALERT_TOKEN_TYPE";
pub const ENV_DATABASE: &str = "SNOWALERT_DATABASE";
pub const ENV_SCHEMA: &str = "SNOWALERT_SCHEMA";
pub const ENV_API_URL: &str = "SNOWALERT_API_URL";

const DEFAULT_DATABASE: &str = "snowalert";
const DEFAULT_SCHEMA: &str = "public";

/// How `SNOWALERT_TOKEN` authenticates against the SQL API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenType {
    #[default]
    OAuth,
    KeypairJwt,
}

impl TokenType {
    /// Value of the `X-Snowflake-Authorization-Token-Type` header.
    pub fn header_value(self) -> &'static str {
        match self {
            TokenType::OAuth => "OAUTH",
            TokenType::KeypairJwt => "KEYPAIR_JWT",
        }
    }
}

impl FromStr for TokenType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OAUTH" => Ok(TokenType::OAuth),
            "KEYPAIR_JWT" => Ok(TokenType::KeypairJwt),
            _ => Err(ConfigError::InvalidTokenType(s.to_owned())),
        }
    }
}

/// Validated connection settings for a [`crate::SnowflakeStore`].
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub account: String,
    pub user: String,
    pub warehouse: String,
    pub role: String,
    pub database: String,
    pub schema: String,
    pub token: String,
    pub token_type: TokenType,
    pub api_url: Option<String>,
}

impl StoreConfig {
    /// Read settings from the process environment.
    ///
    /// `user` overrides `UPDATE_USER` (the query command takes it as an argument).
    pub fn from_env(user: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup(user, |key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as missing.
    pub fn from_lookup(
        user: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let user = match user.filter(|u| !u.trim().is_empty()) {
            Some(user) => user.to_owned(),
            None => require(ENV_USER)?,
        };
        let token_type = match get(ENV_TOKEN_TYPE) {
            Some(raw) => raw.parse()?,
            None => TokenType::default(),
        };

        Ok(Self {
            account: require(ENV_ACCOUNT)?,
            user,
            warehouse: require(ENV_WAREHOUSE)?,
            role: require(ENV_ROLE)?,
            database: get(ENV_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_owned()),
            schema: get(ENV_SCHEMA).unwrap_or_else(|| DEFAULT_SCHEMA.to_owned()),
            token: require(ENV_TOKEN)?,
            token_type,
            api_url: get(ENV_API_URL),
        })
    }

    /// `<database>.<schema>.<table>` for `kind`.
    pub fn qualified_table(&self, kind: SpecKind) -> String {
        format!("{}.{}.{}", self.database, self.schema, kind.table())
    }

    /// Base URL of the SQL API, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("api_url", &self.api_url)
            .finish()
    }
}
