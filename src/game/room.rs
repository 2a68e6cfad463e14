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

//! A game room: up to two participants, the authoritative game state, and
//! the tick task driving it. All access goes through the room's mutex, so
//! ticks for one match never interleave.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::game::message::FinalScores;
use crate::game::message::PlayerInfo;
use crate::game::message::ServerMessage;
use crate::game::state::GameState;
use crate::game::state::GameStatus;
use crate::game::state::Slot;
use crate::game::state::TICK_INTERVAL;

pub struct Player {
    pub id: String,
    pub name: String,
    pub slot: Slot,
    tx: UnboundedSender<ServerMessage>,
}

impl Player {
    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            number: self.slot.number(),
        }
    }
}

pub struct GameRoom {
    pub id: String,
    players: Vec<Player>,
    pub state: GameState,
    tick_task: Option<JoinHandle<()>>,
}

impl GameRoom {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
            state: GameState::new(),
            tick_task: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= 2
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_task.is_some()
    }

    fn free_slot(&self) -> Option<Slot> {
        if !self.players.iter().any(|p| p.slot == Slot::One) {
            return Some(Slot::One);
        }
        if !self.players.iter().any(|p| p.slot == Slot::Two) {
            return Some(Slot::Two);
        }
        None
    }

    /// Seat a participant. Returns the assigned slot, or None if the room is
    /// full. Announces the join to everyone, sends the newcomer the current
    /// state, and signals readiness once both seats are taken.
    pub fn join(
        &mut self,
        id: String,
        name: Option<String>,
        tx: UnboundedSender<ServerMessage>,
    ) -> Option<Slot> {
        let slot = self.free_slot()?;
        let name = name.unwrap_or_else(|| format!("Player {}", slot.number()));
        log::debug!("{} joined {} as player {}", id, self.id, slot.number());
        self.players.push(Player {
            id,
            name,
            slot,
            tx,
        });
        let newcomer = self.players.last().unwrap().info();
        self.broadcast(&ServerMessage::PlayerJoined {
            player: newcomer,
            total_players: self.players.len(),
        });
        self.send_to(
            slot,
            ServerMessage::GameInit {
                room_id: self.id.clone(),
                player_number: slot.number(),
                game_state: self.state,
            },
        );
        if self.is_full() {
            self.broadcast(&ServerMessage::CanStart {
                message: "Both players are in. Ready to start.".to_string(),
            });
        }
        Some(slot)
    }

    /// Remove a participant. Play stops, the room reverts to waiting, and
    /// the remaining player is told. Returns true when the room is now empty
    /// and should be torn down.
    pub fn leave(&mut self, player_id: &str) -> bool {
        let index = match self.players.iter().position(|p| p.id == player_id) {
            Some(index) => index,
            None => return self.players.is_empty(),
        };
        let player = self.players.remove(index);
        log::debug!("{} left {}", player.id, self.id);
        self.stop_ticking();
        self.state.status = GameStatus::Waiting;
        self.broadcast(&ServerMessage::PlayerLeft {
            player: player.info(),
            total_players: self.players.len(),
        });
        self.players.is_empty()
    }

    pub fn update_paddle(&mut self, slot: Slot, y: f64) {
        self.state.set_paddle(slot, y);
    }

    pub fn broadcast(&self, message: &ServerMessage) {
        for player in &self.players {
            // A closed channel means the player is disconnecting; the socket
            // handler will remove them.
            let _ = player.tx.send(message.clone());
        }
    }

    pub fn send_to(&self, slot: Slot, message: ServerMessage) {
        if let Some(player) = self.players.iter().find(|p| p.slot == slot) {
            let _ = player.tx.send(message);
        }
    }

    fn stop_ticking(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            handle.abort();
        }
    }

    /// Begin play and spawn the 60 Hz tick task for this match. Returns
    /// false unless both seats are taken and the match is not already
    /// running. The task broadcasts a snapshot every tick and stops itself
    /// the moment the match ends.
    pub fn start(room: &Arc<Mutex<GameRoom>>) -> bool {
        let mut guard = room.lock().unwrap();
        if !guard.is_full() || guard.state.status == GameStatus::Playing {
            return false;
        }
        guard.stop_ticking();
        guard.state.start();
        log::debug!("Match started in {}", guard.id);
        let snapshot = guard.state;
        guard.broadcast(&ServerMessage::GameStarted {
            game_state: snapshot,
        });

        let room = Arc::clone(room);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                let mut room = room.lock().unwrap();
                if room.state.status != GameStatus::Playing {
                    room.tick_task = None;
                    break;
                }
                let result = room.state.tick(&mut rand::thread_rng());
                let snapshot = room.state;
                room.broadcast(&ServerMessage::GameUpdate {
                    game_state: snapshot,
                });
                if let Some(result) = result {
                    log::debug!(
                        "Match in {} won by player {} ({}:{})",
                        room.id,
                        result.winner.number(),
                        result.scores.0,
                        result.scores.1
                    );
                    room.broadcast(&ServerMessage::GameEnded {
                        winner: result.winner.number(),
                        scores: FinalScores {
                            player1: result.scores.0,
                            player2: result.scores.1,
                        },
                    });
                    room.tick_task = None;
                    break;
                }
            }
        });
        guard.tick_task = Some(handle);
        true
    }
}

impl Drop for GameRoom {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}
