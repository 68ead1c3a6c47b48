use std::sync::Arc;

use crate::service::{
    config::{ConfigService, ConfigServiceImpl},
    email::{EmailService, SmtpEmailService},
};

pub struct AppState {
    config: Arc<dyn ConfigService>,
    email: Arc<dyn EmailService>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Arc::new(ConfigServiceImpl::new());
        let email = Arc::new(SmtpEmailService::new(config.values()));
        Self::from_parts(config, email)
    }

    pub fn from_parts(config: Arc<dyn ConfigService>, email: Arc<dyn EmailService>) -> Arc<Self> {
        Arc::new(Self { config, email })
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }

    pub fn email(&self) -> &dyn EmailService {
        self.email.as_ref()
    }
}
