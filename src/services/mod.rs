//! Service layer

pub mod resource_service;

pub use resource_service::ResourceService;
