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

//! The WebSocket endpoint for multiplayer matches: a lobby that matches
//! connections into rooms, a read loop per connection, and a writer task
//! draining each player's outbound queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::Message;
use axum::extract::ws::WebSocket;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::SinkExt;
use futures_util::StreamExt;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

use crate::error::Fallible;
use crate::game::message::ClientMessage;
use crate::game::message::ServerMessage;
use crate::game::room::GameRoom;
use crate::game::state::Slot;

/// The set of live rooms. Connections without a free seat get a fresh room.
pub struct Lobby {
    rooms: Mutex<HashMap<String, Arc<Mutex<GameRoom>>>>,
    next_room_id: AtomicU64,
}

impl Lobby {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            next_room_id: AtomicU64::new(1),
        }
    }

    /// The first room with a free seat, or a newly created one.
    fn find_or_create(&self) -> (String, Arc<Mutex<GameRoom>>) {
        let mut rooms = self.rooms.lock().unwrap();
        for (id, room) in rooms.iter() {
            if !room.lock().unwrap().is_full() {
                return (id.clone(), Arc::clone(room));
            }
        }
        let id = format!("room_{}", self.next_room_id.fetch_add(1, Ordering::Relaxed));
        let room = Arc::new(Mutex::new(GameRoom::new(id.clone())));
        rooms.insert(id.clone(), Arc::clone(&room));
        log::debug!("Created {id}");
        (id, room)
    }

    fn remove(&self, room_id: &str) {
        if self.rooms.lock().unwrap().remove(room_id).is_some() {
            log::debug!("Tore down {room_id}");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn start_server(bind: &str) -> Fallible<()> {
    let lobby = Arc::new(Lobby::new());
    let app = Router::new();
    let app = app.route("/ws", get(ws_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(lobby);
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(lobby): State<Arc<Lobby>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, lobby))
}

async fn not_found_handler() -> &'static str {
    "Not Found"
}

/// A connection's seat in a room, once it has joined.
struct Seat {
    room_id: String,
    room: Arc<Mutex<GameRoom>>,
    player_id: String,
    slot: Slot,
}

async fn handle_socket(socket: WebSocket, lobby: Arc<Lobby>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = unbounded_channel::<ServerMessage>();

    log::debug!("WebSocket client connected");

    // Writer task: drain the outbound queue onto the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("Failed to serialize message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut seat: Option<Seat> = None;
    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                log::warn!("WebSocket error: {e}");
                break;
            }
        };
        match message {
            Message::Text(text) => {
                // Real-time transport: malformed input is logged and
                // dropped, never fatal to the match.
                let parsed: ClientMessage = match serde_json::from_str(&text) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        log::warn!("Ignoring malformed message: {e}");
                        continue;
                    }
                };
                handle_message(parsed, &lobby, &tx, &mut seat);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Disconnect: vacate the seat; empty rooms are torn down entirely.
    if let Some(seat) = seat {
        let empty = seat.room.lock().unwrap().leave(&seat.player_id);
        if empty {
            lobby.remove(&seat.room_id);
        }
    }
    writer.abort();
    log::debug!("WebSocket client disconnected");
}

fn handle_message(
    message: ClientMessage,
    lobby: &Arc<Lobby>,
    tx: &UnboundedSender<ServerMessage>,
    seat: &mut Option<Seat>,
) {
    match message {
        ClientMessage::JoinGame {
            player_id,
            player_name,
        } => {
            if seat.is_some() {
                return;
            }
            let player_id = player_id.unwrap_or_else(random_player_id);
            let (room_id, room) = lobby.find_or_create();
            let slot = room
                .lock()
                .unwrap()
                .join(player_id.clone(), player_name, tx.clone());
            match slot {
                Some(slot) => {
                    *seat = Some(Seat {
                        room_id,
                        room,
                        player_id,
                        slot,
                    });
                }
                None => {
                    let _ = tx.send(ServerMessage::Error {
                        message: "Room is full.".to_string(),
                    });
                }
            }
        }
        ClientMessage::StartGame => {
            if let Some(seat) = seat {
                GameRoom::start(&seat.room);
            }
        }
        ClientMessage::PaddleMove { y } => {
            if let Some(seat) = seat {
                seat.room.lock().unwrap().update_paddle(seat.slot, y);
            }
        }
        ClientMessage::Ping { timestamp } => {
            let _ = tx.send(ServerMessage::Pong { timestamp });
        }
    }
}

/// A short random identifier for clients that do not supply one.
fn random_player_id() -> String {
    let mut rng = rand::thread_rng();
    (0..9).map(|_| rng.sample(Alphanumeric) as char).collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn test_server_binds_and_accepts_connections() {
        let port = portpicker::pick_unused_port().unwrap();
        let bind = format!("0.0.0.0:{port}");
        spawn(async move { start_server(&bind).await });
        loop {
            if let Ok(stream) = TcpStream::connect(("0.0.0.0", port)).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_start_server_on_bad_address() {
        let result = start_server("not-an-address").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_lobby_matches_players_into_rooms() {
        let lobby = Arc::new(Lobby::new());
        let (tx, _rx) = unbounded_channel();

        let mut first = None;
        handle_message(
            ClientMessage::JoinGame {
                player_id: Some("p1".to_string()),
                player_name: None,
            },
            &lobby,
            &tx,
            &mut first,
        );
        assert_eq!(lobby.room_count(), 1);
        assert_eq!(first.as_ref().unwrap().slot, Slot::One);

        // The second player lands in the same room.
        let mut second = None;
        handle_message(
            ClientMessage::JoinGame {
                player_id: Some("p2".to_string()),
                player_name: None,
            },
            &lobby,
            &tx,
            &mut second,
        );
        assert_eq!(lobby.room_count(), 1);
        assert_eq!(second.as_ref().unwrap().slot, Slot::Two);
        assert_eq!(
            first.as_ref().unwrap().room_id,
            second.as_ref().unwrap().room_id
        );

        // A third player overflows into a fresh room.
        let mut third = None;
        handle_message(
            ClientMessage::JoinGame {
                player_id: Some("p3".to_string()),
                player_name: None,
            },
            &lobby,
            &tx,
            &mut third,
        );
        assert_eq!(lobby.room_count(), 2);
        assert_eq!(third.as_ref().unwrap().slot, Slot::One);
    }

    #[tokio::test]
    async fn test_second_join_on_same_connection_is_ignored() {
        let lobby = Arc::new(Lobby::new());
        let (tx, _rx) = unbounded_channel();
        let mut seat = None;
        for _ in 0..2 {
            handle_message(
                ClientMessage::JoinGame {
                    player_id: Some("p1".to_string()),
                    player_name: None,
                },
                &lobby,
                &tx,
                &mut seat,
            );
        }
        assert_eq!(lobby.room_count(), 1);
        let room = Arc::clone(&seat.as_ref().unwrap().room);
        assert_eq!(room.lock().unwrap().player_count(), 1);
    }

    #[tokio::test]
    async fn test_ping_echoes_timestamp() {
        let lobby = Arc::new(Lobby::new());
        let (tx, mut rx) = unbounded_channel();
        let mut seat = None;
        handle_message(ClientMessage::Ping { timestamp: 1234 }, &lobby, &tx, &mut seat);
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Pong { timestamp: 1234 });
    }

    #[tokio::test]
    async fn test_paddle_moves_reach_the_room_state() {
        let lobby = Arc::new(Lobby::new());
        let (tx, _rx) = unbounded_channel();
        let mut seat = None;
        handle_message(
            ClientMessage::JoinGame {
                player_id: Some("p1".to_string()),
                player_name: None,
            },
            &lobby,
            &tx,
            &mut seat,
        );
        handle_message(ClientMessage::PaddleMove { y: 120.0 }, &lobby, &tx, &mut seat);
        let room = Arc::clone(&seat.as_ref().unwrap().room);
        let guard = room.lock().unwrap();
        assert_eq!(guard.state.paddle(Slot::One).y, 120.0);
    }

    #[test]
    fn test_random_player_id_shape() {
        let id = random_player_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
