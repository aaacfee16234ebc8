pub mod example;
pub mod grounding;
pub mod identifiers;

pub use example::TrainingExample;
pub use grounding::{Grounding, GroundedCount, GroundingEntry, GroundingMap};
pub use identifiers::{
    ContentVersion, DocumentId, GroundingId, IdentifierError, Shortform, UNGROUNDED,
};
