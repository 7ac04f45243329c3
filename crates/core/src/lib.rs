// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod error;
mod lifecycle;

#[cfg(test)]
mod tests;

pub use booking::check_booking;
pub use error::CoreError;
pub use lifecycle::{
    GuestInfo, admit, clear_walk_in, decide, issue_pass, receive_walk_in, record_exit,
};
