// Input module - synthetic mouse clicks and key presses
pub mod enigo_impl;
pub mod types;

pub use enigo_impl::EnigoInput;
pub use types::{InputDriver, KeyName};
