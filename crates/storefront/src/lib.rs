//! Pinebrook Storefront client library.
//!
//! A headless client for the Pinebrook e-commerce backend: fetches catalog,
//! session, and order data over REST, maintains a client-local shopping cart
//! persisted as a JSON snapshot, and renders page fragments for the listing,
//! account, and admin page contexts.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod filters;
pub mod pages;
pub mod session;
pub mod state;
pub mod ui;
pub mod upload;
pub mod views;
