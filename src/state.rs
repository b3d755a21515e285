use crate::{
    bootstrap,
    config::RuntimeConfiguration,
    error::{GetDatabaseConnectionSnafu, MakeQuerySnafu, OpenDatabaseSnafu, RegistrarResult},
    maud_conveniences::render_nav,
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};
use std::ops::Deref;

#[derive(Clone, Debug)]
pub struct RegistrarState {
    pool: Pool<Postgres>,
}

impl RegistrarState {
    pub async fn new(options: PgPoolOptions, config: &RuntimeConfiguration) -> RegistrarResult<Self> {
        let pool = options
            .connect(&config.db_config().get_db_url())
            .await
            .context(OpenDatabaseSnafu)?;

        bootstrap::run(&pool).await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Registrar" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav())
                    (markup)
                }
            }
        }
    }

    pub async fn get_connection(&self) -> RegistrarResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn ping(&self) -> RegistrarResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}

impl Deref for RegistrarState {
    type Target = Pool<Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
