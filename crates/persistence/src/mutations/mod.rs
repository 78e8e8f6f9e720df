// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event persistence
//! - `notifications`: Notification inserts and read markers
//! - `requests`: Request rows
//! - `territories`: Territory rows and appended history
//! - `users`: Accounts and sessions
//! - `transitions`: Transactional orchestration combining the above with
//!   the pure transitions of `territory-core`

pub mod audit;
pub mod notifications;
pub mod requests;
pub mod territories;
pub mod transitions;
pub mod users;
