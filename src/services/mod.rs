pub mod auth_service;
pub use auth_service::{AuthError, AuthService};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod chat_service;
pub use chat_service::{ChatError, ChatService};

pub mod chat_service_impl;
pub use chat_service_impl::SeaOrmChatService;

pub mod settings_service;
pub use settings_service::{SettingsError, SettingsService};

pub mod settings_service_impl;
pub use settings_service_impl::SeaOrmSettingsService;

pub mod persona;
pub mod reply;
pub use reply::{MockReplyGenerator, ReplyGenerator, UpstreamReplyGenerator};

pub mod token;
pub use token::TokenSigner;
