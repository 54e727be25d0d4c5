pub mod courier;
pub mod order;
pub mod time_window;
