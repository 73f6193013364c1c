pub mod list;
pub mod switch;

pub use list::ListCommand;
pub use switch::SwitchCommand;
