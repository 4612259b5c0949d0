pub mod enums;
pub mod notification;
pub mod page;
pub mod therapy;
pub mod user;

pub use enums::*;
pub use notification::*;
pub use page::*;
pub use therapy::*;
pub use user::*;
