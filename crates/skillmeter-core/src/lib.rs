//! skillmeter-core: Timed assessment state machine, question banks, and reports.
//!
//! This crate defines the data model, the session state machine, and the
//! result formatting that the rest of skillmeter builds on. It performs no
//! timing of its own: a clock elsewhere calls [`session::AssessmentSession::tick`].

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
