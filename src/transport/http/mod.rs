pub mod router;
pub mod types;
pub mod handlers {
    pub mod accounts;
    pub mod catalog;
    pub mod common;
    pub mod enterprises;
    pub mod health;
    pub mod products;
    pub mod reference;
    pub mod saves;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
