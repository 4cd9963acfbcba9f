pub mod credential;
pub mod credential_definition;
pub mod master_secret;
pub mod revocation_registry_definition;
pub mod schema;
