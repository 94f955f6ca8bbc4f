//! Backend for the expense portal: admin self-signup, employee provisioning,
//! profile reads and password changes over a key-value profile store, with
//! authentication delegated to Supabase Auth.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;
