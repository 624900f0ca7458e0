pub mod field;
pub mod form;
pub mod schema;
pub mod submission;

pub use field::*;
pub use form::*;
pub use schema::*;
pub use submission::*;
