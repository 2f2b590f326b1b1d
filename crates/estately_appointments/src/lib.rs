// --- File: crates/estately_appointments/src/lib.rs ---
// Scheduling core
pub mod availability;
pub mod calendar;
#[cfg(test)]
mod calendar_proptest;
#[cfg(test)]
mod calendar_test;
pub mod meeting_type;
pub mod models;
pub mod picker;
pub mod slots;

// Marketplace access
pub mod api;
pub mod client;
pub mod context;
pub mod schedule_loader;

// Flows
pub mod lifecycle;
pub mod listing;
pub mod report;
pub mod wizard;

// HTTP surface
pub mod doc;
pub mod handlers;
pub mod routes;
#[cfg(test)]
mod routes_test;
