//! HTTP request handlers

pub mod api;
pub mod common;
pub mod health;
pub mod pages;
