//! API handlers for the MapleStore backend

pub mod admin;
pub mod auth;
pub mod orders;
pub mod products;
