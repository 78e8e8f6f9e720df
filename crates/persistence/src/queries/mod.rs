// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Each submodule maps Diesel row structs onto domain or data-model types.
//! Nothing here writes to the database.

pub mod audit;
pub mod notifications;
pub mod requests;
pub mod territories;
pub mod users;
