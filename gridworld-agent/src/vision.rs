//! Vision: locate the character and the goal in a frame by template matching.
//!
//! Scores use the normalised squared difference
//!
//! ```text
//! R(x, y) = Σ (T - I)² / sqrt(Σ T² · Σ I²)
//! ```
//!
//! summed over the template window and all three channels. Lower is better;
//! a perfect match scores 0. Result rows are scored in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::frame::{Frame, Region, GREEN};
use crate::game::Platformer;

/// Best (lowest) score and its top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub min_value: f64,
    pub location: (usize, usize),
}

pub fn match_template(image: &Frame, template: &Frame) -> Result<MatchResult> {
    let (iw, ih) = (image.width(), image.height());
    let (tw, th) = (template.width(), template.height());
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return Err(AgentError::TemplateTooLarge {
            template_w: tw,
            template_h: th,
            image_w: iw,
            image_h: ih,
        });
    }

    let img = image.pixels();
    let tpl = template.pixels();
    let sum_t2: f64 = tpl.iter().map(|&t| (t as f64) * (t as f64)).sum();

    let score = |x: usize, y: usize| -> f64 {
        let mut diff = 0.0;
        let mut sum_i2 = 0.0;
        for ty in 0..th {
            let irow = ((y + ty) * iw + x) * 3;
            let trow = ty * tw * 3;
            for k in 0..tw * 3 {
                let i = img[irow + k] as f64;
                let t = tpl[trow + k] as f64;
                diff += (t - i) * (t - i);
                sum_i2 += i * i;
            }
        }
        let denom = (sum_t2 * sum_i2).sqrt();
        if denom > 0.0 {
            diff / denom
        } else if diff == 0.0 {
            0.0
        } else {
            1.0
        }
    };

    let best = (0..=ih - th)
        .into_par_iter()
        .map(|y| {
            (0..=iw - tw)
                .map(|x| (score(x, y), x, y))
                .fold((f64::INFINITY, 0, 0), |best, cur| if cur.0 < best.0 { cur } else { best })
        })
        .reduce(
            || (f64::INFINITY, usize::MAX, usize::MAX),
            // Ties resolve to the first position in row-major order
            |a, b| {
                if a.0 < b.0 || (a.0 == b.0 && (a.2, a.1) < (b.2, b.1)) {
                    a
                } else {
                    b
                }
            },
        );

    Ok(MatchResult {
        min_value: best.0,
        location: (best.1, best.2),
    })
}

/// Where the character and the goal are, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub character: (i64, i64),
    pub goal: (i64, i64),
    /// `goal - character`. Negative y means the goal is above.
    pub offset: (i64, i64),
    pub character_score: f64,
    pub goal_score: f64,
}

/// Vision settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Offsets within this many pixels on both axes count as the same.
    pub tolerance_px: i64,
    /// Upper bound on captures taken by one stable detection.
    pub max_captures: usize,
    /// Part of the screen to capture. `None` captures everything.
    pub region: Option<Region>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            tolerance_px: 5,
            max_captures: 10,
            region: None,
        }
    }
}

pub struct Vision {
    character: Frame,
    goal: Frame,
    config: VisionConfig,
}

impl Vision {
    pub fn new(character: Frame, goal: Frame, config: VisionConfig) -> Self {
        Self {
            character,
            goal,
            config,
        }
    }

    /// Vision using the game's own sprites as templates.
    pub fn for_game(game: &Platformer, config: VisionConfig) -> Self {
        Self::new(game.character_sprite(), game.goal_sprite(), config)
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn detect(&self, frame: &Frame) -> Result<Detection> {
        let (c, g) = rayon::join(
            || match_template(frame, &self.character),
            || match_template(frame, &self.goal),
        );
        let (c, g) = (c?, g?);

        let character = (c.location.0 as i64, c.location.1 as i64);
        let goal = (g.location.0 as i64, g.location.1 as i64);
        let detection = Detection {
            character,
            goal,
            offset: (goal.0 - character.0, goal.1 - character.1),
            character_score: c.min_value,
            goal_score: g.min_value,
        };
        debug!(character = ?character, goal = ?goal, offset = ?detection.offset, "detected");
        Ok(detection)
    }

    /// Capture and detect until two successive offsets agree within the
    /// tolerance on either axis. Gives up after `max_captures` and returns the
    /// latest detection.
    pub fn stable_detection<F>(&self, mut capture: F) -> Result<Detection>
    where
        F: FnMut() -> Result<Frame>,
    {
        let mut prev = self.detect(&capture()?)?;
        for _ in 1..self.config.max_captures.max(2) {
            let next = self.detect(&capture()?)?;
            if self.agrees(&prev, &next) {
                return Ok(next);
            }
            prev = next;
        }
        warn!(max_captures = self.config.max_captures, "scene never settled");
        Ok(prev)
    }

    fn agrees(&self, a: &Detection, b: &Detection) -> bool {
        (a.offset.0 - b.offset.0).abs() <= self.config.tolerance_px
            || (a.offset.1 - b.offset.1).abs() <= self.config.tolerance_px
    }

    /// Outline both matches in green.
    pub fn annotate(&self, frame: &mut Frame, detection: &Detection) {
        for (pos, tpl) in [(detection.character, &self.character), (detection.goal, &self.goal)] {
            frame.draw_rectangle(
                pos.0.max(0) as usize,
                pos.1.max(0) as usize,
                tpl.width(),
                tpl.height(),
                GREEN,
                2,
            );
        }
    }
}
