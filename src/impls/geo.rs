pub mod bigdatacloud;
pub mod device;
pub mod ip_api;
pub mod ipapi;
pub mod mapbox;
