pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use error::LabdeskError;
pub use router::{LabdeskState, labdesk_router};
