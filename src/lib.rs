#[macro_use]
extern crate derive_builder;

pub mod body;
mod body_reader;
pub mod error;
pub mod handler;
pub mod job;
pub mod media;
pub mod model;
pub mod printer;
pub mod projector;
pub mod result;
pub mod server;
pub mod service;
pub mod system;
mod utils;
pub mod validator;
