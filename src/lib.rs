//! Nutrition-generation backend: turns free-text and image meal requests
//! into structured nutrition data through a generative model, and serves
//! cached meal/ingredient imagery from an object store.

pub mod assets;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod ingredient_api;
pub mod models;
pub mod prompts;
pub mod storage;
pub mod transport;
pub mod variant;
