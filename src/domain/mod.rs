pub mod calendar;
pub mod error;
pub mod resource;
pub mod session;
pub mod task;
pub mod views;

pub use calendar::*;
pub use error::*;
pub use resource::*;
pub use session::*;
pub use task::*;
pub use views::*;
