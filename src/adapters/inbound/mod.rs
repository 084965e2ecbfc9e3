pub mod views;
mod web_server;

pub use web_server::{router, ErrorPage, HealthResponse, WebServer, WebState, REQUEST_ID_HEADER};
