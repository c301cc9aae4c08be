//! Service contracts beyond plain storage: the Stage Worker Protocol's
//! per-stage hook, its collaborators, signed-URL issuance, and token
//! resolution (spec §4.4, §4.7, §4.8). As with `repositories`, only the
//! contracts live here; implementations live in the core crate.

mod collaborators;
mod signing;
mod stage_handler;
mod token_resolver;

pub use collaborators::{ExtractedText, Packager, Segmenter, Synthesizer, SynthesizedAudio, TextExtractor, TextSegment};
pub use signing::{SignedUrlClaims, SigningService};
pub use stage_handler::{FailureClass, StageError, StageHandler};
pub use token_resolver::TokenResolver;
