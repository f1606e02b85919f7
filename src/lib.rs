pub mod api;
pub mod cli;
pub mod core;
pub mod inbox;
pub mod jobs;
pub mod roles;
pub mod sending;
pub mod settings;
pub mod webhook;
