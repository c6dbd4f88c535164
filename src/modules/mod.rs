pub mod auth;
pub mod books;
pub mod bookstore;
pub mod users;

use std::sync::Arc;

use anyhow::Context;
use shelf_authz::{CredentialStore, IdentityIssuer, TokenIssuer};
use shelf_kernel::{settings::Settings, ModuleRegistry};

use books::{policy::default_policy, service::BookService};

/// Services shared between modules. Built once per process from settings.
#[derive(Clone)]
pub struct AppServices {
    pub books: Arc<BookService>,
    pub identity: Arc<IdentityIssuer>,
}

impl AppServices {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::from_settings(&settings.auth)
            .context("failed to configure identity tokens")?;

        Ok(Self {
            books: Arc::new(BookService::in_memory(default_policy())),
            identity: Arc::new(IdentityIssuer::new(
                CredentialStore::seeded(),
                Arc::new(tokens),
            )),
        })
    }
}

/// Register every application module, in mount order.
pub fn register_all(registry: &mut ModuleRegistry, services: &AppServices) -> anyhow::Result<()> {
    registry.register(Arc::new(auth::AuthModule::new(services.identity.clone())))?;
    registry.register(Arc::new(books::BooksModule::new(
        services.books.clone(),
        services.identity.tokens().clone(),
    )))?;
    registry.register(Arc::new(bookstore::BookstoreModule::new(
        services.books.clone(),
    )))?;
    registry.register(Arc::new(users::UsersModule::in_memory()))?;
    Ok(())
}
