pub mod http;

pub use http::handle_ipp_via_http;
