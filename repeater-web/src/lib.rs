mod client;
mod error;
mod request;
#[cfg(test)]
mod request_test;
mod response;

pub use client::{Client, ClientConfig};
pub use error::RequestError;
pub use request::{Request, RequestBuilder};
pub use response::Response;
