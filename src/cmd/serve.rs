// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::Config;
use crate::error::Fallible;
use crate::game::server::start_server;

pub async fn serve(bind: Option<String>, config: &Config) -> Fallible<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    println!("Serving matches on ws://{bind}/ws");
    start_server(&bind).await
}
