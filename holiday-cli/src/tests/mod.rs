//! Shared test harness modules for the holiday CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod converse_steps;
mod helpers;
mod recommend_steps;
