pub mod accounts;
mod catalog;
pub mod enterprises;
pub mod marketplace_service;
pub mod products;
mod reference;
mod saves;

pub use accounts::{AccountProfile, CreateAccount, RegisterEnterpriseAccount, RegisteredEnterpriseAccount};
pub use enterprises::{CreateEnterprise, NewExternalLink};
pub use marketplace_service::MarketplaceService;
pub use products::{CreateProduct, ImageInput, ImageSource};
