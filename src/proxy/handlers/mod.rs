// Handlers module - inbound REST endpoints

pub mod integrations;
pub mod mailgun;
pub mod sentry;
