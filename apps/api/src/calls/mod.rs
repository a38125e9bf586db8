// Interview calls: registration with the voice provider, post-call retrieval and the
// live session flags the browser client drives through SDK events.

pub mod handlers;
pub mod register;
pub mod retrieval;
pub mod session;
