pub mod auth_service;
pub mod comment_service;
pub mod person_service;
pub mod post_service;
pub mod search_service;
pub mod user_service;
pub mod vetting_service;
pub mod vote_service;
