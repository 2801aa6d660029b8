pub mod catalog;
pub mod config;
pub mod humanize;
pub mod observability;
pub mod remote;
pub mod selection;
pub mod session;
