use crate::error::{BadEnvVarSnafu, ParsePortSnafu, RegistrarResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RegistrarResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    host: String,
    port: u16,
    database: String,
    ssl: bool,
}

impl DbConfig {
    pub fn new() -> RegistrarResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            host: get_env_var("DB_HOST")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
            ssl: var("DB_SSL").is_ok_and(|ssl| ssl.eq_ignore_ascii_case("true")),
        })
    }

    pub fn get_db_url(&self) -> String {
        let url = format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database
        );

        if self.ssl {
            format!("{url}?sslmode=require")
        } else {
            url
        }
    }
}
