use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::db;
use crate::todos::repo::{PgTodoStore, TodoStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub async fn init(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;

        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
            todos: Arc::new(PgTodoStore::new(pool)) as Arc<dyn TodoStore>,
            config,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{Environment, JwtConfig};
        use crate::memory::MemoryStore;

        let config = Arc::new(AppConfig {
            environment: Environment::Test,
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "memory://".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: None,
            },
        });

        let store = Arc::new(MemoryStore::default());
        Self {
            config,
            users: store.clone(),
            todos: store,
        }
    }
}
