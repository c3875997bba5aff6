// Connection lifecycle: pending requests that the addressee accepts, or
// either party deletes. One row per unordered user pair, enforced on create.

pub mod handlers;
