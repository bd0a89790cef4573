pub mod api;
pub mod app;
pub mod assistant;
pub mod clock;
pub mod conversation;
pub mod markdown;
pub mod routes;
pub mod storage;
