pub mod config;
pub mod db;
pub mod details;
pub mod dto;
pub mod entity;
pub mod error;
pub mod models;
pub mod pagination;
pub mod response;
pub mod revalidate;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
