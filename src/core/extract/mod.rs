// Change extraction

pub mod batch;
pub mod extractor;

pub use batch::ChangeBatch;
pub use extractor::{ChangeExtractor, PollResult};
