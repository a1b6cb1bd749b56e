pub mod annotator;
pub mod normalizer;
pub mod paraphraser;
pub mod proofreader;

#[cfg(test)]
pub(crate) mod testing;

pub use annotator::{AnnotatedDocument, Edit, Mark};
pub use normalizer::{extract_generated_text, normalize_errors};
pub use paraphraser::Paraphraser;
pub use proofreader::Proofreader;
