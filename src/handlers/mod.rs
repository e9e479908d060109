pub mod auth;
pub mod comments;
pub mod persons;
pub mod posts;
pub mod search;
pub mod users;
pub mod vetting;
