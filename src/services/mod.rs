pub mod assembler;
pub mod candidates;
pub mod filter_options;
pub mod filter_validator;
pub mod filters;
pub mod profile;
pub mod providers;
pub mod recommendations;
pub mod scoring;

pub use recommendations::{EnhancedRequest, RecommendationService};
