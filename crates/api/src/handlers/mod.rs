pub mod auth;
pub mod leads;
pub mod permissions;
pub mod roles;
pub mod sites;
