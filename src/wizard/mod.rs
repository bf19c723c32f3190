pub mod preferences;
pub mod sequencer;

pub use preferences::{Preferences, PreferenceSelection};
pub use sequencer::{Advance, Section, Step, StepSequencer, ValidationError};
