// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Each module maps its table's rows back into domain values. A row that
//! no longer parses is reported as a reconstruction error, never skipped.

pub mod audit;
pub mod events;
pub mod inscriptions;
pub mod payments;
pub mod users;
