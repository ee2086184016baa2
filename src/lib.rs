// src/lib.rs

//! Racing results capture library

pub mod dom;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
