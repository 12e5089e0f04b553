// Connect API Library
//
// HTTP/JSON API for room signaling and admission control

pub mod http;

pub use http::AppState;
