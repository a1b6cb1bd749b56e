pub mod editor;

pub use editor::{ActionOutcome, EditorSession, EditorView};
