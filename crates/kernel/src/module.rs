use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while it is brought up.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A unit of the application: a mount point, its routes and its lifecycle.
///
/// Hooks run in registration order, except [`Module::stop`] which runs in
/// reverse.
#[async_trait]
pub trait Module: Sync + Send {
    /// Mount name; routes are served under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Prepare state (seed stores, validate settings) before traffic arrives.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with module-relative `paths` and any `components`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
