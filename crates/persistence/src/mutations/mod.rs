// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Uniqueness rules (one live inscription per account and per CPF in an
//! event, one account per email and CPF) are enforced by indexes. A
//! violation surfaces as `PersistenceError::UniqueViolation`.

pub mod audit;
pub mod events;
pub mod inscriptions;
pub mod payments;
pub mod users;
