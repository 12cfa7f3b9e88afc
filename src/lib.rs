pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::MarketplaceService;
pub use domain::audit::{Action, AuditLogEntry, DeleteAuditPolicy, EntityKind};
pub use domain::catalog::{CatalogItem, EnterpriseCatalog};
pub use domain::error::{ErrorKind, LedgerError, LedgerResult};
pub use storage::reference::ReferenceKind;
