// Co-founder suggestion engine: weighted multi-factor profile similarity
// over the candidate pool, minus existing and pending connections.

pub mod engine;
pub mod handlers;
pub mod stores;
