use std::sync::Arc;

use anyhow::Result;
use stylesync_core::Catalog;

use super::{config::Config, store::UserStore};

pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub users: UserStore,
    pub config: Config,
}

impl AppState {
    pub fn new() -> Result<Arc<Self>> {
        let config = Config::load();
        let users = UserStore::open(config.db_path.as_deref())?;

        Ok(Arc::new(Self {
            catalog: Catalog::sample(),
            users,
            config,
        }))
    }
}
