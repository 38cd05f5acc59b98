//! A small todo-list web application.
//!
//! Requests flow one way: [`route`] dispatches to [`handler`], handlers call
//! the [`action`] layer, and actions talk to the [`store`] and invalidate the
//! cached listing page held in [`cache`].

pub mod action;
pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod page;
pub mod route;
pub mod schema;
pub mod store;

use cache::ListingCache;
use page::Pages;
use store::TodoStore;

// Struct representing the application state
#[derive(Debug)]
pub struct AppState {
    pub store: TodoStore,
    pub listing: ListingCache,
    pub pages: Pages,
}

impl AppState {
    pub fn new(store: TodoStore) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            listing: ListingCache::new(),
            pages: Pages::new()?,
        })
    }
}
