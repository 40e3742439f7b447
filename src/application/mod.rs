//! Application layer: repository traits and the cache-aside services.

mod cached;
pub mod dishes;
pub mod error;
pub mod menus;
pub mod repos;
pub mod submenus;
pub mod sync;

pub use dishes::DishService;
pub use error::ServiceError;
pub use menus::MenuService;
pub use submenus::SubmenuService;
pub use sync::{CatalogRow, CatalogSync, SyncError, SyncReport};
