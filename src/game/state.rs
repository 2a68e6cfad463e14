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

//! The authoritative table-tennis simulation. The server owns this state;
//! clients only ever submit paddle positions and observe snapshots.

use std::f64::consts::FRAC_PI_4;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

/// Table dimensions, in abstract units shared with the clients.
pub const TABLE_WIDTH: f64 = 800.0;
pub const TABLE_HEIGHT: f64 = 450.0;

/// The ball bounces when its centre reaches this close to a wall.
const BALL_RADIUS: f64 = 8.0;

const PADDLE_HEIGHT: f64 = 100.0;

/// The highest position a paddle's top edge can take.
pub const PADDLE_TRAVEL: f64 = TABLE_HEIGHT - PADDLE_HEIGHT;

/// The horizontal bands in which each paddle can contact the ball.
const LEFT_PADDLE_BAND: (f64, f64) = (30.0, 42.0);
const RIGHT_PADDLE_BAND: (f64, f64) = (758.0, 770.0);

/// Each paddle contact scales the horizontal speed by this factor, up to the
/// cap.
const SPEED_GROWTH: f64 = 1.05;
const MAX_SPEED: f64 = 15.0;

/// Serve velocity: fixed horizontal speed, random vertical drift.
const SERVE_SPEED: f64 = 5.0;
const SERVE_DRIFT: f64 = 3.0;

/// First player to reach this score wins the match.
pub const WIN_SCORE: u32 = 11;

/// The simulation advances at 60 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

/// Which side of the table a participant plays on. Slot one defends the
/// left edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Ended,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Ball {
    fn centered() -> Self {
        Self {
            x: TABLE_WIDTH / 2.0,
            y: TABLE_HEIGHT / 2.0,
            dx: SERVE_SPEED,
            dy: SERVE_DRIFT,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Paddle {
    pub y: f64,
    pub score: u32,
}

impl Paddle {
    fn new() -> Self {
        Self {
            y: PADDLE_TRAVEL / 2.0,
            score: 0,
        }
    }
}

/// Both paddles, keyed by slot on the wire.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Paddles {
    pub player1: Paddle,
    pub player2: Paddle,
}

/// The winner and final scores of a finished match.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MatchResult {
    pub winner: Slot,
    pub scores: (u32, u32),
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct GameState {
    pub ball: Ball,
    pub paddles: Paddles,
    pub status: GameStatus,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            ball: Ball::centered(),
            paddles: Paddles {
                player1: Paddle::new(),
                player2: Paddle::new(),
            },
            status: GameStatus::Waiting,
        }
    }

    /// Begin play: zero the scores, centre the ball, start simulating.
    pub fn start(&mut self) {
        self.ball = Ball::centered();
        self.paddles.player1.score = 0;
        self.paddles.player2.score = 0;
        self.status = GameStatus::Playing;
    }

    pub fn paddle(&self, slot: Slot) -> &Paddle {
        match slot {
            Slot::One => &self.paddles.player1,
            Slot::Two => &self.paddles.player2,
        }
    }

    fn paddle_mut(&mut self, slot: Slot) -> &mut Paddle {
        match slot {
            Slot::One => &mut self.paddles.player1,
            Slot::Two => &mut self.paddles.player2,
        }
    }

    /// Apply a client-reported paddle position. The server trusts the value
    /// but clamps it to the table.
    pub fn set_paddle(&mut self, slot: Slot, y: f64) {
        self.paddle_mut(slot).y = y.clamp(0.0, PADDLE_TRAVEL);
    }

    /// Advance the simulation one tick. A no-op unless the match is being
    /// played; returns the match result on the tick that ends it.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Option<MatchResult> {
        if self.status != GameStatus::Playing {
            return None;
        }

        self.ball.x += self.ball.dx;
        self.ball.y += self.ball.dy;

        // Wall bounce. Clamping the position keeps a fast ball from
        // tunnelling past the wall in a single tick.
        if self.ball.y <= BALL_RADIUS {
            self.ball.y = BALL_RADIUS;
            self.ball.dy = self.ball.dy.abs();
        } else if self.ball.y >= TABLE_HEIGHT - BALL_RADIUS {
            self.ball.y = TABLE_HEIGHT - BALL_RADIUS;
            self.ball.dy = -self.ball.dy.abs();
        }

        // Paddle contact: reflect, speed up, and set the exit angle from the
        // contact offset. A centre hit goes out flat, an edge hit steep.
        let left = self.paddles.player1;
        if self.ball.x >= LEFT_PADDLE_BAND.0
            && self.ball.x <= LEFT_PADDLE_BAND.1
            && self.ball.y >= left.y
            && self.ball.y <= left.y + PADDLE_HEIGHT
        {
            self.ball.dx = (self.ball.dx.abs() * SPEED_GROWTH).min(MAX_SPEED);
            let offset = (left.y + PADDLE_HEIGHT / 2.0 - self.ball.y) / (PADDLE_HEIGHT / 2.0);
            let angle = offset * FRAC_PI_4;
            self.ball.dy = self.ball.dx * -angle.sin();
        }
        let right = self.paddles.player2;
        if self.ball.x >= RIGHT_PADDLE_BAND.0
            && self.ball.x <= RIGHT_PADDLE_BAND.1
            && self.ball.y >= right.y
            && self.ball.y <= right.y + PADDLE_HEIGHT
        {
            self.ball.dx = -(self.ball.dx.abs() * SPEED_GROWTH).min(MAX_SPEED);
            let offset = (right.y + PADDLE_HEIGHT / 2.0 - self.ball.y) / (PADDLE_HEIGHT / 2.0);
            let angle = offset * FRAC_PI_4;
            self.ball.dy = -self.ball.dx * -angle.sin();
        }

        // Scoring: the ball left the table past a paddle.
        if self.ball.x < 0.0 {
            return self.score_point(Slot::Two, rng);
        }
        if self.ball.x > TABLE_WIDTH {
            return self.score_point(Slot::One, rng);
        }
        None
    }

    fn score_point(&mut self, scorer: Slot, rng: &mut impl Rng) -> Option<MatchResult> {
        self.paddle_mut(scorer).score += 1;
        self.serve(rng);
        let scores = (self.paddles.player1.score, self.paddles.player2.score);
        if self.paddle(scorer).score >= WIN_SCORE {
            self.status = GameStatus::Ended;
            return Some(MatchResult {
                winner: scorer,
                scores,
            });
        }
        None
    }

    /// Put the ball back in the centre with a fresh random direction.
    fn serve(&mut self, rng: &mut impl Rng) {
        self.ball = Ball {
            x: TABLE_WIDTH / 2.0,
            y: TABLE_HEIGHT / 2.0,
            dx: if rng.gen_bool(0.5) {
                SERVE_SPEED
            } else {
                -SERVE_SPEED
            },
            dy: rng.gen_range(-SERVE_DRIFT..SERVE_DRIFT),
        };
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
