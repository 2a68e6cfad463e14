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

//! The wire protocol: tagged message types exchanged with game clients as
//! JSON over WebSockets. The `type` tags and field names are part of the
//! client contract.

use serde::Deserialize;
use serde::Serialize;

use crate::game::state::GameState;

/// Messages clients send to the server.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask to be matched into a room.
    #[serde(rename_all = "camelCase")]
    JoinGame {
        #[serde(default)]
        player_id: Option<String>,
        #[serde(default)]
        player_name: Option<String>,
    },
    /// Ask to begin play. Ignored unless the room is full.
    StartGame,
    /// The latest paddle position. Last value wins within a tick.
    PaddleMove { y: f64 },
    /// Heartbeat; the timestamp is echoed back for latency measurement.
    Ping { timestamp: i64 },
}

/// A participant as described to clients.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub number: u8,
}

/// Final scores reported when the match ends.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct FinalScores {
    pub player1: u32,
    pub player2: u32,
}

/// Messages the server sends to clients.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent to a player on joining: their slot and the current state.
    #[serde(rename_all = "camelCase")]
    GameInit {
        room_id: String,
        player_number: u8,
        game_state: GameState,
    },
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        player: PlayerInfo,
        total_players: usize,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player: PlayerInfo,
        total_players: usize,
    },
    /// Both seats are taken; either player may start the game.
    CanStart { message: String },
    #[serde(rename_all = "camelCase")]
    GameStarted { game_state: GameState },
    /// The per-tick full state snapshot. No delta compression.
    #[serde(rename_all = "camelCase")]
    GameUpdate { game_state: GameState },
    GameEnded { winner: u8, scores: FinalScores },
    Pong { timestamp: i64 },
    Error { message: String },
}
