pub mod error_item;
pub mod selection;
pub mod synonyms;

pub use error_item::{Correction, ErrorItem};
pub use selection::Selection;
pub use synonyms::SynonymList;
