//! Fixed-cadence tick loop gluing input, simulation, networking and drawing

use crate::game::{LossCause, SnakeGame, TickReport};
use crate::input::InputManager;
use crate::render::Renderer;
use crate::sync::{PeerLink, RemoteEvent};
use log::info;
use macroquad::prelude::next_frame;
use std::time::{Duration, Instant};

const GAME_OVER_DISPLAY: Duration = Duration::from_secs(3);

pub struct Session {
    game: SnakeGame,
    link: Option<PeerLink>,
    input: InputManager,
    renderer: Renderer,
    tick: Duration,
}

impl Session {
    pub fn new(game: SnakeGame, link: Option<PeerLink>, renderer: Renderer, tick_rate: u32) -> Self {
        Self {
            game,
            link,
            input: InputManager::new(),
            renderer,
            tick: Duration::from_secs_f64(1.0 / tick_rate as f64),
        }
    }

    pub async fn run(mut self) {
        if let Some(link) = &self.link {
            // announce ourselves once, then wait for the peer to show up
            link.publish_fruit(self.game.fruit);
            link.publish_body(self.game.snake.body());

            if !self.wait_for_peer().await {
                info!("quit while waiting for the other player");
                return;
            }
            self.game.start();
        }

        self.game_loop().await;
    }

    /// Cooperative join wait: one frame per iteration, so quit requests stay
    /// responsive. Returns false when the player quit instead of waiting.
    async fn wait_for_peer(&mut self) -> bool {
        info!("waiting for the other player");

        loop {
            if self.input.sample() {
                return false;
            }

            self.drain_remote();
            if self.game.peer_ready() {
                return true;
            }

            self.renderer.draw_banner("Waiting for other player");
            next_frame().await;
        }
    }

    async fn game_loop(&mut self) {
        let mut next_tick = Instant::now() + self.tick;

        loop {
            if self.input.sample() {
                info!("quit requested");
                return;
            }

            if Instant::now() >= next_tick {
                next_tick += self.tick;

                self.drain_remote();
                let report = self.game.tick(self.input.take_steer());
                self.publish(&report);

                if let Some(cause) = report.lost {
                    self.game_over(cause).await;
                    return;
                }
            }

            self.draw();
            next_frame().await;
        }
    }

    /// Applies every remote update delivered since the previous tick.
    fn drain_remote(&mut self) {
        if let Some(link) = &mut self.link {
            for event in link.poll() {
                match event {
                    RemoteEvent::SnakeBody(body) => self.game.apply_remote_body(body),
                    RemoteEvent::Fruit(pos) => self.game.apply_remote_fruit(pos),
                }
            }
        }
    }

    /// Fruit announcement first (if any), then the body — every tick, the
    /// losing one included, so the peer sees the final position.
    fn publish(&self, report: &TickReport) {
        if let Some(link) = &self.link {
            if let Some(fruit) = report.new_fruit {
                link.publish_fruit(fruit);
            }
            link.publish_body(self.game.snake.body());
        }
    }

    fn draw(&self) {
        let remote = if self.game.peer_ready() {
            Some(self.game.mirror.body.as_slice())
        } else {
            None
        };
        self.renderer
            .draw_board(self.game.snake.body(), remote, self.game.fruit);
    }

    async fn game_over(&mut self, cause: LossCause) {
        match cause {
            LossCause::PeerSnake => info!("game over: ran into the other snake"),
            LossCause::Wall => info!("game over: ran into the wall"),
            LossCause::SelfBite => info!("game over: ran into ourselves"),
        }

        let until = Instant::now() + GAME_OVER_DISPLAY;
        while Instant::now() < until {
            if self.input.sample() {
                return;
            }
            self.draw();
            self.renderer.draw_banner("Game Over");
            next_frame().await;
        }
    }
}
