//! Shelf application library.
//!
//! Assembles the `auth`, `books`, `bookstore` and `users` modules on top of
//! the shelf kernel and HTTP stack.

pub mod modules;

use anyhow::Context;
use axum::Router;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::AppServices;

/// A fully registered application, ready to be initialized and served.
pub struct App {
    pub registry: ModuleRegistry,
    pub services: AppServices,
}

impl App {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let services = AppServices::from_settings(settings)?;
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &services)?;
        Ok(Self { registry, services })
    }

    /// Run every module's `init` hook, seeding stores when configured.
    pub async fn init(&self, settings: &Settings) -> anyhow::Result<()> {
        self.registry
            .init_all(&InitCtx { settings })
            .await
            .context("module initialization failed")
    }

    pub fn router(&self, settings: &Settings) -> Router {
        shelf_http::build_router(&self.registry, settings)
    }
}

/// Initialize, start and serve the application until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let app = App::new(&settings)?;
    app.init(&settings).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    app.registry
        .start_all(&ctx)
        .await
        .context("module start failed")?;

    let served = shelf_http::start_server(&app.registry, &settings, shutdown_signal()).await;

    app.registry.stop_all().await?;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
