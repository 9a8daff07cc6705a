pub mod error;
pub mod prices;
pub mod service;
pub mod window;
