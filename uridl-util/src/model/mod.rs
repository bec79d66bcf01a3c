mod credentials;
mod lang;
mod submission;

pub use credentials::*;
pub use lang::*;
pub use submission::*;
