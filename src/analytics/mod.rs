//! Classroom and school-wide analytics.
//!
//! [`Roster`] assembles per-student records from the store for the teacher dashboard;
//! the functions in [`admin`] roll those records up for the admin dashboard. Dashboards
//! refresh by re-running the whole aggregation on a timer ([`spawn_refresh`]).

pub mod admin;
mod poller;
mod roster;

pub use poller::*;
pub use roster::*;
