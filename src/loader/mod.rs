mod fetcher;
mod note_loader;

pub use fetcher::{ContentFetcher, StaticFetcher};
pub use note_loader::{LoadedNote, NoteLoader};
