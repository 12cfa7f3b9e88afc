pub mod entities;
pub mod reference;
pub mod relations;
pub mod schema;
