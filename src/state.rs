use std::sync::Arc;

use crate::config::{Config, ReplyProvider};
use crate::db::Store;
use crate::services::{
    AuthService, ChatService, MockReplyGenerator, ReplyGenerator, SeaOrmAuthService,
    SeaOrmChatService, SeaOrmSettingsService, SettingsService, TokenSigner,
    UpstreamReplyGenerator,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub chat_service: Arc<dyn ChatService>,

    pub settings_service: Arc<dyn SettingsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let generator: Arc<dyn ReplyGenerator> = match config.assistant.provider {
            ReplyProvider::Mock => Arc::new(MockReplyGenerator),
            ReplyProvider::Upstream => {
                Arc::new(UpstreamReplyGenerator::new(store.clone(), &config.assistant)?)
            }
        };

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            TokenSigner::from_config(&config.security),
            config.security.clone(),
            config.bootstrap.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let chat_service = Arc::new(SeaOrmChatService::new(store.clone(), generator))
            as Arc<dyn ChatService + Send + Sync + 'static>;

        let settings_service = Arc::new(SeaOrmSettingsService::new(store.clone()))
            as Arc<dyn SettingsService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            chat_service,
            settings_service,
        })
    }
}
