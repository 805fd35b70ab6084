#[cfg(feature = "opencv")]
pub mod cascade;
pub mod detector;
pub mod region;
pub mod session;

#[cfg(feature = "opencv")]
pub use cascade::HaarCascade;
pub use detector::{Annotation, Annotator, Classifier, Detector};
pub use region::Region;
pub use session::{LoopState, RunSummary, Session};
