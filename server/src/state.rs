// server/src/state.rs

use crate::config::AppConfig;
use crate::pipelines::PipelineSet;
use crate::services::rate_limiter::LoginRateLimiter;
use crate::services::token_service::TokenService;
use crate::store::ShopStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn ShopStore>,
  pub config: Arc<AppConfig>,
  pub tokens: Arc<TokenService>,
  pub login_limiter: Arc<LoginRateLimiter>,
  pub pipelines: Arc<PipelineSet>,
}

impl AppState {
  pub fn new(store: Arc<dyn ShopStore>, config: AppConfig) -> Self {
    let tokens = TokenService::from_config(&config);
    let login_limiter = LoginRateLimiter::new(config.login_max_failures, config.login_window);
    Self {
      store,
      tokens: Arc::new(tokens),
      login_limiter: Arc::new(login_limiter),
      config: Arc::new(config),
      pipelines: Arc::new(PipelineSet::build()),
    }
  }
}
