use clap::Parser;
use client::game::{GridConfig, SnakeGame};
use client::render::{Renderer, CELL_PX};
use client::session::Session;
use client::sync::{LinkConfig, PeerLink};
use log::{error, info};
use macroquad::prelude::Conf;
use shared::protocol;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local player name; together with --opponent, enables networked play
    #[arg(short, long)]
    player: Option<String>,

    /// Name of the remote player to mirror
    #[arg(short, long)]
    opponent: Option<String>,

    /// Broker address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    broker: String,

    /// Topic root shared by both players
    #[arg(short, long, default_value = protocol::DEFAULT_TOPIC_ROOT)]
    topic: String,

    /// Simulation ticks per second
    #[arg(long, default_value_t = shared::DEFAULT_TICK_RATE)]
    tick_rate: u32,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "duosnake".to_string(),
        window_width: (shared::BOARD_WIDTH as f32 * CELL_PX) as i32,
        window_height: (shared::BOARD_HEIGHT as f32 * CELL_PX) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    let link = match (&args.player, &args.opponent) {
        (Some(player), Some(opponent)) => {
            info!("playing as {} against {}", player, opponent);
            let config = LinkConfig {
                broker: args.broker.clone(),
                topic_root: args.topic.clone(),
                player: player.clone(),
                opponent: opponent.clone(),
            };
            match PeerLink::connect(config) {
                Ok(link) => Some(link),
                Err(e) => {
                    error!("cannot start networked session: {}", e);
                    return;
                }
            }
        }
        (None, None) => None,
        _ => {
            error!("networked play needs both --player and --opponent");
            return;
        }
    };

    let game = SnakeGame::new(GridConfig::default(), link.is_some());
    let renderer = Renderer::new(CELL_PX);

    Session::new(game, link, renderer, args.tick_rate).run().await;
}
