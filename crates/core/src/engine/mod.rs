//! Synchronous building blocks of a timed quiz attempt.
//!
//! None of these types know about phases or I/O; the session controller in
//! the services crate composes them.

mod answers;
mod countdown;
mod navigator;
mod scorer;

pub use answers::{AnswerSheet, AnswerSheetError};
pub use countdown::{Countdown, CountdownTick};
pub use navigator::Navigator;
pub use scorer::{count_correct, score};
