pub mod controller;
pub mod interface;
pub mod rapidapi;

pub use controller::*;
pub use interface::*;
pub use rapidapi::RapidApiTranslator;
