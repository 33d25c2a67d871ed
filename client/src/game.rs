//! Local game state machine
//!
//! Owns the authoritative local snake and the fruit, mirrors the peer's
//! last reported body, and decides when the session is lost. The remote
//! snake is never simulated here: its body is replaced wholesale whenever
//! the synchronization layer delivers an update.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Direction, Point, Snake};

/// Board geometry plus the margin kept clear when spawning things.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub safe_border: i32,
}

impl GridConfig {
    /// The border is a percentage of the smaller dimension.
    pub fn new(width: i32, height: i32, border_percent: i32) -> Self {
        Self {
            width,
            height,
            safe_border: border_percent * width.min(height) / 100,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(
            shared::BOARD_WIDTH,
            shared::BOARD_HEIGHT,
            shared::SAFE_BORDER_PERCENT,
        )
    }
}

/// The peer's last reported body. Not simulated, only drawn and collided
/// against; its cells need not be grid-adjacent.
#[derive(Debug, Clone, Default)]
pub struct RemoteMirror {
    pub body: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForPeer,
    Running,
    Lost,
}

/// What ended the session, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossCause {
    PeerSnake,
    Wall,
    SelfBite,
}

/// What a single tick produced, for the orchestrator to act on.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickReport {
    /// Freshly spawned fruit to announce to the peer.
    pub new_fruit: Option<Point>,
    pub lost: Option<LossCause>,
}

pub struct SnakeGame {
    config: GridConfig,
    networked: bool,
    pub snake: Snake,
    pub fruit: Point,
    pub mirror: RemoteMirror,
    phase: Phase,
    settle_ticks: u32,
    rng: StdRng,
}

impl SnakeGame {
    pub fn new(config: GridConfig, networked: bool) -> Self {
        Self::with_rng(config, networked, StdRng::from_entropy())
    }

    /// Seeded variant, used by the deterministic tests.
    pub fn with_rng(config: GridConfig, networked: bool, mut rng: StdRng) -> Self {
        let start = random_point(&mut rng, &config);
        let snake = Snake::new(start, Direction::Right, shared::DEFAULT_MAX_LENGTH);
        let fruit = random_point(&mut rng, &config);

        // grace period: the mirror holds stale data right after the join,
        // so peer collisions are ignored for the first few local ticks
        let settle_ticks = snake.body().len() as u32 + 1;

        Self {
            config,
            networked,
            snake,
            fruit,
            mirror: RemoteMirror::default(),
            phase: if networked {
                Phase::WaitingForPeer
            } else {
                Phase::Running
            },
            settle_ticks,
            rng,
        }
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the peer's first body update has arrived.
    pub fn peer_ready(&self) -> bool {
        !self.mirror.body.is_empty()
    }

    /// Leaves the join wait.
    pub fn start(&mut self) {
        if self.phase == Phase::WaitingForPeer {
            info!("peer joined, starting");
            self.phase = Phase::Running;
        }
    }

    /// Replaces the mirrored body with the peer's latest report.
    pub fn apply_remote_body(&mut self, body: Vec<Point>) {
        self.mirror.body = body;
    }

    /// Adopts the fruit position the peer announced (last write wins).
    pub fn apply_remote_fruit(&mut self, pos: Point) {
        self.fruit = pos;
    }

    /// One simulation step. Does nothing outside `Running`.
    pub fn tick(&mut self, steer: Option<Direction>) -> TickReport {
        let mut report = TickReport::default();
        if self.phase != Phase::Running {
            return report;
        }

        if let Some(direction) = steer {
            self.snake.steer(direction);
        }

        let head = self.snake.step();

        if head == self.fruit {
            self.snake.grow();
            self.fruit = random_point(&mut self.rng, &self.config);
            debug!("fruit eaten at {:?}, next at {:?}", head, self.fruit);
            report.new_fruit = Some(self.fruit);
        }

        if self.networked {
            if self.settle_ticks > 0 {
                self.settle_ticks -= 1;
            } else if self.mirror.body.contains(&head) {
                self.phase = Phase::Lost;
                report.lost = Some(LossCause::PeerSnake);
                return report;
            }
        }

        if head.x < 0 || head.y < 0 || head.x > self.config.width || head.y > self.config.height {
            self.phase = Phase::Lost;
            report.lost = Some(LossCause::Wall);
        } else if self.snake.is_self_colliding() {
            self.phase = Phase::Lost;
            report.lost = Some(LossCause::SelfBite);
        }

        report
    }
}

/// Uniform cell inside the safe interior on both axes.
fn random_point(rng: &mut StdRng, config: &GridConfig) -> Point {
    Point::new(
        rng.gen_range(config.safe_border..=config.width - config.safe_border),
        rng.gen_range(config.safe_border..=config.height - config.safe_border),
    )
}
