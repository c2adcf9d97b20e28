pub mod application;
pub mod location;
pub mod message;
pub mod ngo;
pub mod opportunity;
pub mod profile;
pub mod stats;
