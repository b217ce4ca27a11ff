// Library exports for feedline
// Integration tests drive the router and controllers through these modules

pub mod auth;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod graphql;
pub mod profile;
pub mod routes;
pub mod state;
pub mod views;
