#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod sessions;

pub use app_services::AppServices;
pub use catalog::CatalogService;
pub use error::{ApiError, CatalogError, CollectorError, FlowError};
pub use gateway::{ApiConfig, HttpGateway, InMemoryBackend, TestBackend};

pub use sessions::{
    AnswerCollector, AnswerMap, SessionFlow, SessionProgress, SessionState,
};
