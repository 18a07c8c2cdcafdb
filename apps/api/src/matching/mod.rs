// Matching core: input units, the request orchestrator, score tiers and the results pager.
// All scoring happens in the external matching backend, reached through `MatchService`.

pub mod classifier;
pub mod models;
pub mod orchestrator;
pub mod pager;
