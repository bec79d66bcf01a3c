#![warn(clippy::all)]

mod actor;
mod page;
mod session;

use uridl_config as config;
use uridl_util::{console, model, service};

use crate::console::Console;

pub use actor::UriActor;
pub use session::{AuthError, Session};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
