//! Data models for Libris server

pub mod book;
pub mod ledger;
pub mod user;
