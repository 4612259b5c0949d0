//! TherapyTrack: role-scoped practice management for a speech therapy
//! clinic. SQLite storage, an axum API, and a strict visibility policy
//! between patients, therapists, supervisors, and admins.

pub mod accounts;
pub mod allocation;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notifications;
pub mod plans;
pub mod reports;
pub mod roster;
pub mod scope;
pub mod sessions;
pub mod state;

#[cfg(test)]
pub mod testutil;
