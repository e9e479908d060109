pub mod comment;
pub mod person;
pub mod post;
pub mod search;
pub mod user;
pub mod vetting;
pub mod vote;

pub use comment::*;
pub use person::*;
pub use post::*;
pub use search::*;
pub use user::*;
pub use vetting::*;
pub use vote::*;

use regex::Regex;
use std::sync::LazyLock;

pub static PHONE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s\-()]{7,20}$").expect("valid phone regex"));
