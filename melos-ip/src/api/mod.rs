//! HTTP API for melos-ip

pub mod assets;
pub mod derivatives;
pub mod events;
pub mod health;
pub mod royalties;
pub mod verification;
