//! The Gridworld platformer the agent plays.
//!
//! A level is an ASCII grid:
//!   `#` solid ground, `C` character start, `G` goal, `.` empty.
//!
//! Physics run on a fixed cell clock: every `move_interval_ms` the character
//! moves one cell horizontally (if Left or Right is held) and one cell
//! vertically (rising during a jump, otherwise falling until grounded).
//! Falling off the bottom of the grid restarts the level.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::{Action, Key};
use crate::error::{AgentError, Result};
use crate::frame::{Frame, Region, Rgb};

/// Default level: the goal sits on a ledge up and to the right of the start.
pub const DEFAULT_LEVEL: &str = "\
....................
....................
..............G.....
...........######...
....................
..C.................
####################
####################";

const SKY: Rgb = [92, 148, 252];
const GROUND: Rgb = [120, 72, 32];
const GROUND_EDGE: Rgb = [64, 160, 48];
const CHARACTER_BODY: Rgb = [200, 24, 24];
const CHARACTER_FACE: Rgb = [250, 230, 210];
const GOAL_BODY: Rgb = [236, 112, 176];
const GOAL_BOW: Rgb = [250, 250, 250];

/// Physics and rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// ASCII level layout.
    pub level: String,
    /// Milliseconds per cell of movement.
    pub move_interval_ms: f64,
    /// Cells risen per jump.
    pub jump_height: usize,
    /// Pixel size of one cell when rendered.
    pub cell_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            move_interval_ms: 100.0,
            jump_height: 3,
            cell_size: 16,
        }
    }
}

/// A parsed level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    solid: Vec<bool>,
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

impl Level {
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(AgentError::Level {
                line: 1,
                reason: "level is empty".into(),
            });
        }

        let mut solid = Vec::with_capacity(width * height);
        let mut start = None;
        let mut goal = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(AgentError::Level {
                    line: y + 1,
                    reason: format!("expected {} columns", width),
                });
            }
            for (x, c) in row.chars().enumerate() {
                match c {
                    '#' => solid.push(true),
                    '.' => solid.push(false),
                    'C' | 'G' => {
                        let slot = if c == 'C' { &mut start } else { &mut goal };
                        if slot.is_some() {
                            return Err(AgentError::Level {
                                line: y + 1,
                                reason: format!("more than one {:?}", c),
                            });
                        }
                        *slot = Some((x, y));
                        solid.push(false);
                    }
                    other => {
                        return Err(AgentError::Level {
                            line: y + 1,
                            reason: format!("unknown tile {:?}", other),
                        })
                    }
                }
            }
        }

        let start = start.ok_or_else(|| AgentError::Level {
            line: height,
            reason: "no character start 'C'".into(),
        })?;
        let goal = goal.ok_or_else(|| AgentError::Level {
            line: height,
            reason: "no goal 'G'".into(),
        })?;

        Ok(Self {
            width,
            height,
            solid,
            start,
            goal,
        })
    }

    /// Solid tile at (x, y). Anything left or right of the grid is a wall;
    /// above and below are open.
    pub fn is_solid(&self, x: i64, y: i64) -> bool {
        if x < 0 || x >= self.width as i64 {
            return true;
        }
        if y < 0 || y >= self.height as i64 {
            return false;
        }
        self.solid[y as usize * self.width + x as usize]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HeldKeys {
    left: bool,
    right: bool,
    space: bool,
}

/// The platformer itself. Deterministic given the same key and tick sequence.
#[derive(Debug, Clone)]
pub struct Platformer {
    level: Level,
    config: GameConfig,
    x: i64,
    y: i64,
    held: HeldKeys,
    rise_left: usize,
    clock_ms: f64,
    won: bool,
    restarts: usize,
}

impl Platformer {
    pub fn new(config: GameConfig) -> Result<Self> {
        if config.move_interval_ms <= 0.0 || config.cell_size == 0 {
            return Err(AgentError::Config(
                "move_interval_ms and cell_size must be positive".into(),
            ));
        }
        let level = Level::parse(&config.level)?;
        let (x, y) = level.start;
        Ok(Self {
            x: x as i64,
            y: y as i64,
            level,
            config,
            held: HeldKeys::default(),
            rise_left: 0,
            clock_ms: 0.0,
            won: false,
            restarts: 0,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Character cell.
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    pub fn reached_goal(&self) -> bool {
        self.won
    }

    /// How many times the level has been restarted.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    fn grounded(&self) -> bool {
        self.level.is_solid(self.x, self.y + 1)
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = true,
            Key::Right => self.held.right = true,
            Key::Space => self.held.space = true,
            Key::Escape => self.restart(),
        }
    }

    pub fn release(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = false,
            Key::Right => self.held.right = false,
            Key::Space => self.held.space = false,
            Key::Escape => {}
        }
    }

    /// Put the character back at the start with nothing held.
    pub fn restart(&mut self) {
        let (x, y) = self.level.start;
        self.x = x as i64;
        self.y = y as i64;
        self.held = HeldKeys::default();
        self.rise_left = 0;
        self.clock_ms = 0.0;
        self.won = false;
        self.restarts += 1;
        debug!(restarts = self.restarts, "level restarted");
    }

    /// Advance physics by `dt_ms` of game time.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.won || dt_ms <= 0.0 {
            return;
        }
        self.clock_ms += dt_ms;
        while self.clock_ms >= self.config.move_interval_ms {
            self.clock_ms -= self.config.move_interval_ms;
            self.advance_cell();
            if self.won {
                break;
            }
        }
    }

    fn advance_cell(&mut self) {
        // Jump start
        if self.held.space && self.rise_left == 0 && self.grounded() {
            self.rise_left = self.config.jump_height;
        }

        // Horizontal
        let dir = match (self.held.left, self.held.right) {
            (false, true) => 1,
            (true, false) => -1,
            _ => 0,
        };
        if dir != 0 && !self.level.is_solid(self.x + dir, self.y) {
            self.x += dir;
        }

        // Vertical
        if self.rise_left > 0 {
            if self.level.is_solid(self.x, self.y - 1) {
                self.rise_left = 0;
            } else {
                self.y -= 1;
                self.rise_left -= 1;
            }
        } else if !self.grounded() {
            self.y += 1;
        }

        if self.y >= self.level.height as i64 {
            info!("fell out of the level");
            self.restart();
            return;
        }

        if (self.x, self.y) == (self.level.goal.0 as i64, self.level.goal.1 as i64) {
            self.won = true;
            info!(x = self.x, y = self.y, "goal reached");
        }
    }

    /// Template the vision routine uses to find the character.
    pub fn character_sprite(&self) -> Frame {
        character_sprite(self.config.cell_size)
    }

    /// Template the vision routine uses to find the goal.
    pub fn goal_sprite(&self) -> Frame {
        goal_sprite(self.config.cell_size)
    }

    /// Draw the whole level.
    pub fn render(&self) -> Frame {
        let cs = self.config.cell_size;
        let mut frame = Frame::new(self.level.width * cs, self.level.height * cs, SKY);

        for y in 0..self.level.height {
            for x in 0..self.level.width {
                if self.level.is_solid(x as i64, y as i64) {
                    frame.fill_rect(x * cs, y * cs, cs, cs, GROUND);
                    if !self.level.is_solid(x as i64, y as i64 - 1) {
                        frame.fill_rect(x * cs, y * cs, cs, (cs / 4).max(1), GROUND_EDGE);
                    }
                }
            }
        }

        if !self.won {
            let (gx, gy) = self.level.goal;
            frame.blit(&self.goal_sprite(), gx * cs, gy * cs);
        }
        if self.y >= 0 {
            frame.blit(&self.character_sprite(), self.x as usize * cs, self.y as usize * cs);
        }
        frame
    }
}

fn character_sprite(cs: usize) -> Frame {
    let mut s = Frame::new(cs, cs, CHARACTER_BODY);
    let q = (cs / 4).max(1);
    // Eyes
    s.fill_rect(q, q, q, q, CHARACTER_FACE);
    s.fill_rect(cs - 2 * q, q, q, q, CHARACTER_FACE);
    // Mouth
    s.fill_rect(q, cs - 2 * q, cs - 2 * q, (q / 2).max(1), CHARACTER_FACE);
    s
}

fn goal_sprite(cs: usize) -> Frame {
    let mut s = Frame::new(cs, cs, GOAL_BODY);
    let q = (cs / 4).max(1);
    // Bow across the top
    s.fill_rect(0, 0, cs, q, GOAL_BOW);
    s.fill_rect(cs / 2 - q / 2, q, q, q, GOAL_BOW);
    s
}

// =============================================================================
// Live wrapper
// =============================================================================

struct Live {
    game: Platformer,
    last: Instant,
}

/// Thread-safe handle to a platformer that keeps running in wall-clock time.
///
/// Physics catch up on every access: the wall time elapsed since the last
/// access, divided by `time_scale`, is fed to [`Platformer::tick`].
#[derive(Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<Live>>,
    time_scale: f64,
}

impl SharedGame {
    /// `time_scale` is wall milliseconds per game millisecond.
    pub fn new(game: Platformer, time_scale: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Live {
                game,
                last: Instant::now(),
            })),
            time_scale,
        }
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Wall-clock duration of `game_ms` game milliseconds.
    pub fn scaled(&self, game_ms: f64) -> Duration {
        Duration::from_secs_f64((game_ms * self.time_scale).max(0.0) / 1000.0)
    }

    fn lock(&self) -> MutexGuard<'_, Live> {
        let mut live = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let elapsed_ms = now.duration_since(live.last).as_secs_f64() * 1000.0;
        live.last = now;
        live.game.tick(elapsed_ms / self.time_scale);
        live
    }

    /// Run `f` against the up-to-date game.
    pub fn with<R>(&self, f: impl FnOnce(&mut Platformer) -> R) -> R {
        f(&mut self.lock().game)
    }

    pub fn press(&self, key: Key) {
        self.with(|g| g.press(key));
    }

    pub fn release(&self, key: Key) {
        self.with(|g| g.release(key));
    }

    pub fn restart(&self) {
        self.with(Platformer::restart);
    }

    pub fn reached_goal(&self) -> bool {
        self.with(|g| g.reached_goal())
    }

    pub fn position(&self) -> (i64, i64) {
        self.with(|g| g.position())
    }

    /// Screenshot of the game, optionally cropped to `region`.
    pub fn capture(&self, region: Option<Region>) -> Result<Frame> {
        let frame = self.with(|g| g.render());
        match region {
            Some(r) => frame.crop(r),
            None => Ok(frame),
        }
    }

    /// Hold the action's keys for `hold_ms` game milliseconds. Blocks the thread.
    pub fn perform(&self, action: Action, hold_ms: f64) {
        for &k in action.keys() {
            self.press(k);
        }
        std::thread::sleep(self.scaled(hold_ms));
        for &k in action.keys() {
            self.release(k);
        }
    }

    /// Async variant of [`SharedGame::perform`].
    pub async fn perform_async(&self, action: Action, hold_ms: f64) {
        for &k in action.keys() {
            self.press(k);
        }
        tokio::time::sleep(self.scaled(hold_ms)).await;
        for &k in action.keys() {
            self.release(k);
        }
    }

    /// Tap a key: press, wait, release, wait.
    pub async fn tap(&self, key: Key, gap_ms: f64) {
        self.press(key);
        tokio::time::sleep(self.scaled(gap_ms)).await;
        self.release(key);
        tokio::time::sleep(self.scaled(gap_ms)).await;
    }
}
