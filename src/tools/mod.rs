pub mod list_categories;
pub mod open_docs;
pub mod search;

pub use list_categories::*;
pub use open_docs::*;
pub use search::*;
