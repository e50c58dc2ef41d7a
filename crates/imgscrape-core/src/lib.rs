//! imgscrape core: a bounded concurrent task scheduler and the page-image
//! download pipeline built on it.

pub mod config;
pub mod logging;

pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod resource;
pub mod scheduler;
pub mod storage;
pub mod url_model;
