/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::step;
use sim::world::Session;
use ui::compose::Compositor;
use ui::input::InputState;
use ui::renderer::{Renderer, CROP_BOTTOM, CROP_LEFT, CROP_RIGHT, CROP_TOP};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_FORWARD: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_BOOST: &[KeyCode] = &[KeyCode::Char('j'), KeyCode::Char('J')];
const KEYS_NEXT_LEVEL: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

fn main() {
    let config = GameConfig::load();
    let mut session = Session::new(config.start_level, config.tuning.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut compositor = Compositor::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }

        // Level switches replace the whole session and only ever land
        // on a tick boundary.
        if kb.any_pressed(KEYS_NEXT_LEVEL) {
            *session = Session::new(session.level.next(), config.tuning.clone());
        }

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput {
                left: kb.any_held(KEYS_LEFT),
                right: kb.any_held(KEYS_RIGHT),
                forward: kb.any_held(KEYS_FORWARD),
                back: kb.any_held(KEYS_BACK),
                boost: kb.any_held(KEYS_BOOST),
            };

            let mut needs_redraw = step::tick(session, input);

            // Compose a margin larger than the display so edge glyphs
            // fall into the crop instead of tearing.
            let (tw, th) = renderer.poll_size()?;
            let buf_w = tw + CROP_LEFT + CROP_RIGHT;
            let buf_h = th + CROP_TOP + CROP_BOTTOM;
            needs_redraw |= compositor.resize(buf_w, buf_h);

            if needs_redraw {
                compositor.compose(session);
                let hud = format!(
                    " {}  |  WASD move   J jetpack   N next world   Q quit ",
                    session.level.name()
                );
                renderer.present(compositor.buffer(), &hud)?;
            }

            last_tick = Instant::now();
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
