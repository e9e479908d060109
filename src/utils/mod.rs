pub mod filters;
pub mod pagination;
pub mod permissions;
pub mod phone;
pub mod trending;
pub mod votes;
