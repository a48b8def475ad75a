//! # xpert-resolve
//!
//! Expert identity resolution for xpert.
//!
//! Given a newly observed expert profile, decide whether it is a new person
//! or a repeat of an existing meta-expert, merge or create accordingly, and
//! enrich the result with job seniority and expertise tags.
//!
//! - [`similarity`]: normalized Levenshtein name distance
//! - [`disambiguator`]: LLM choice among near-duplicate candidates
//! - [`resolver`]: the resolution state machine
//! - [`enricher`]: seniority classification and tag generation
//! - [`profile`], [`photo`], [`ingest`]: provider profile ingestion

pub mod disambiguator;
pub mod enricher;
pub mod ingest;
pub mod photo;
pub mod profile;
pub mod resolver;
pub mod similarity;

pub use disambiguator::Disambiguator;
pub use enricher::Enricher;
pub use ingest::{IngestOutcome, IngestPipeline};
pub use photo::PhotoPolicy;
pub use profile::{normalize_profile_url, PartialDate, ProviderProfile};
pub use resolver::{EntityResolver, MatchMethod, Resolution, ResolutionStage, ResolverConfig};
pub use similarity::{distance, name_distance, normalized_distance};
