pub mod request;
pub mod webhook;
