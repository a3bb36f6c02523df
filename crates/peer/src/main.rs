mod app;
mod transport;
mod tui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use tandem::{ConfigError, PeerRole, PointerButton, SessionConfig};

use app::PeerApp;
use tui::TuiState;

#[derive(Parser)]
#[command(name = "tandem-peer")]
#[command(about = "Tandem p2p arcade peer")]
struct Args {
    #[arg(short, long, help = "Broker address, host:port")]
    broker: Option<String>,

    #[arg(short, long, default_value = "tandem")]
    name: String,

    #[arg(short, long, default_value_t = 0, help = "0 = coins peer, 1 = player peer")]
    player: u8,

    #[arg(long, default_value_t = tandem::store::COIN_COUNT)]
    coins: u32,

    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    #[arg(long)]
    headless: bool,

    #[arg(long, help = "Start coin motion without the left-click gesture")]
    auto_start: bool,

    #[arg(long, help = "Arm local collision detection at startup")]
    detect: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let role = PeerRole::from_index(args.player).ok_or(ConfigError::InvalidPlayer(args.player))?;
    let broker = args
        .broker
        .unwrap_or_else(|| format!("127.0.0.1:{}", tandem::DEFAULT_PORT));
    let process_name = format!("{} player{}", args.name, args.player);
    let config = SessionConfig::new(role, process_name, broker, args.coins, args.tick_rate)?;

    let mut peer = PeerApp::connect(config)?;
    if args.auto_start {
        peer.session().enable_simulation();
    }
    if args.detect {
        peer.session().enable_collision_detection();
    }

    if args.headless {
        run_headless(&mut peer)
    } else {
        run_with_tui(&mut peer)?;
        peer.shutdown();
        Ok(())
    }
}

fn run_headless(peer: &mut PeerApp) -> Result<()> {
    log::info!("running headless; interrupt to quit");
    loop {
        peer.update()?;
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn run_with_tui(peer: &mut PeerApp) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_state = TuiState::new();
    let bounds = peer.session().config().bounds;

    loop {
        if let Err(err) = peer.update() {
            log::error!("tick publish failed: {err}");
            break;
        }

        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        if let Some((x, y)) = tui_state.field_coords(bounds, mouse.column, mouse.row)
                        {
                            if let Err(err) = peer.pointer_moved(x, y) {
                                log::error!("pointer publish failed: {err}");
                                break;
                            }
                        }
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        peer.pointer_pressed(PointerButton::Left);
                    }
                    MouseEventKind::Down(MouseButton::Right) => {
                        peer.pointer_pressed(PointerButton::Right);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let view = tui::View {
            score: peer.session().score(),
            alive: peer.session().alive_count(),
            role: peer.session().config().role.as_str(),
            simulate: peer.session().simulation_enabled(),
            detect: peer.session().collision_detection_enabled(),
            renderables: peer.session().renderables(),
            bounds,
        };
        terminal.draw(|frame| tui::render(frame, &mut tui_state, &view))?;
    }

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    )?;

    Ok(())
}
