pub mod background;
pub mod batch;
pub mod error;
pub mod logging;
pub mod processor;

pub use batch::{run, BatchReport, FileOutcome, BUILDINGS_DIR};
pub use error::{Result, SpriteError};
pub use processor::{prepare_sprite, Prepared, RemoverSettings};
