// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Serde helpers for calendar dates.

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");
