// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::{AsaasClient, AsaasConfig};
use httpmock::MockServer;

pub const API_KEY: &str = "$aact_test_key";

pub fn create_test_client(server: &MockServer) -> AsaasClient {
    AsaasClient::new(AsaasConfig::with_base_url(API_KEY, &server.base_url())).unwrap()
}
