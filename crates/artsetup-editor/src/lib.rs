pub mod config;
pub mod debounce;
pub mod history;
pub mod memory;
pub mod persistence;
pub mod scenario;
pub mod session;

pub use config::EditorConfig;
pub use debounce::{Debouncer, SaveSink};
pub use history::History;
pub use memory::{MemoryArtworkStore, MemoryImageGenerator, MemoryScenarioStore, SaveLogEntry};
pub use persistence::{
    ArtworkStore, ImageGenerator, ImageUpload, NewArtwork, PersistenceError, PersistenceEvent, ScenarioStore,
    StoredArtwork,
};
pub use scenario::ScenarioBoard;
pub use session::{EditorSession, SessionError};
