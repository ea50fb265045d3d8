pub mod contact_locator;
pub mod droid;
pub mod extractor;
pub mod harvester;
pub mod orchestrator;
pub mod serp_client;

pub use contact_locator::*;
pub use droid::*;
pub use extractor::*;
pub use harvester::*;
pub use orchestrator::*;
pub use serp_client::*;
