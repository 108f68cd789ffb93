//! Live track rendering.
//!
//! Every monitor snapshot becomes one screen:
//!
//! ```text
//! --- Raceway ---
//! Track: 500m | Bet on racer: 3
//! -------------------------------------------
//! Racer 1 : [------->                                          ] (75/500m)
//! Racer 2 : [-----X                                            ] (52/500m)
//! Racer 2 stumbled!
//! ```

use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use raceway_core::{LaneStatus, LaneView, RaceSnapshot};
use std::fmt::Write as _;
use std::io::{self, Write};

/// Columns a full track occupies on screen.
pub const TRACK_WIDTH: usize = 50;

/// Draws snapshots as text tracks.
#[derive(Debug, Clone)]
pub struct TrackRenderer {
    track_length: u32,
    bet: Option<u32>,
    clear: bool,
}

impl TrackRenderer {
    pub fn new(track_length: u32) -> Self {
        Self {
            track_length: track_length.max(1),
            bet: None,
            clear: true,
        }
    }

    pub fn with_bet(mut self, bet: Option<u32>) -> Self {
        self.bet = bet;
        self
    }

    /// Whether each frame starts by clearing the terminal.
    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Renders one frame as text.
    pub fn render(&self, snapshot: &RaceSnapshot) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- Raceway ---");
        match self.bet {
            Some(bet) => {
                let _ = writeln!(out, "Track: {}m | Bet on racer: {}", self.track_length, bet);
            }
            None => {
                let _ = writeln!(out, "Track: {}m", self.track_length);
            }
        }
        let _ = writeln!(out, "{}", "-".repeat(43));

        for lane in &snapshot.lanes {
            let _ = writeln!(out, "{}", self.lane_line(lane));
        }
        for id in snapshot.stalled() {
            let _ = writeln!(out, "Racer {} stumbled!", id);
        }
        for id in snapshot.eliminated() {
            let _ = writeln!(out, "Racer {} has been eliminated from the race!", id);
        }
        out
    }

    /// Writes one frame to `out`, clearing the screen first if enabled.
    pub fn draw<W: Write>(&self, out: &mut W, snapshot: &RaceSnapshot) -> io::Result<()> {
        if self.clear {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        out.write_all(self.render(snapshot).as_bytes())?;
        out.flush()
    }

    fn lane_line(&self, lane: &LaneView) -> String {
        let position = lane.position.min(self.track_length);
        let cells = (u64::from(position) * TRACK_WIDTH as u64 / u64::from(self.track_length)) as usize;
        let glyph = if position >= self.track_length {
            LaneStatus::Finished.glyph()
        } else {
            lane.status.glyph()
        };
        let padding = TRACK_WIDTH.saturating_sub(cells + 1);

        format!(
            "Racer {:<2}: [{}{}{}] ({}/{}m)",
            lane.id.0,
            "-".repeat(cells),
            glyph,
            " ".repeat(padding),
            lane.position,
            self.track_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raceway_core::RacerId;
    use std::time::Duration;

    fn lane(id: u32, position: u32, status: LaneStatus) -> LaneView {
        LaneView {
            id: RacerId(id),
            position,
            status,
        }
    }

    fn snapshot(lanes: Vec<LaneView>) -> RaceSnapshot {
        RaceSnapshot {
            elapsed: Duration::ZERO,
            retired: 0,
            lanes,
        }
    }

    #[test]
    fn test_lane_scaled_to_width() {
        let renderer = TrackRenderer::new(500);
        let line = renderer.lane_line(&lane(1, 250, LaneStatus::Advancing));

        let expected = format!("Racer 1 : [{}>{}] (250/500m)", "-".repeat(25), " ".repeat(24));
        assert_eq!(line, expected);
    }

    #[test]
    fn test_finished_lane_fills_track() {
        let renderer = TrackRenderer::new(10);
        let line = renderer.lane_line(&lane(12, 10, LaneStatus::Finished));

        assert_eq!(line, format!("Racer 12: [{}F] (10/10m)", "-".repeat(50)));
    }

    #[test]
    fn test_glyph_follows_status() {
        let renderer = TrackRenderer::new(100);
        assert!(renderer.lane_line(&lane(1, 0, LaneStatus::Stalled)).contains("[X "));
        assert!(renderer.lane_line(&lane(1, 0, LaneStatus::Eliminated)).contains("[# "));
    }

    #[test]
    fn test_notices_listed_after_tracks() {
        let renderer = TrackRenderer::new(100).with_bet(Some(2));
        let frame = renderer.render(&snapshot(vec![
            lane(1, 10, LaneStatus::Stalled),
            lane(2, 20, LaneStatus::Advancing),
            lane(3, 5, LaneStatus::Eliminated),
        ]));

        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[1], "Track: 100m | Bet on racer: 2");
        assert_eq!(lines.len(), 3 + 3 + 2);
        assert_eq!(lines[6], "Racer 1 stumbled!");
        assert_eq!(lines[7], "Racer 3 has been eliminated from the race!");
    }

    #[test]
    fn test_draw_without_clear_is_plain_text() {
        let renderer = TrackRenderer::new(10).with_clear(false);
        let frame = snapshot(vec![lane(1, 3, LaneStatus::Advancing)]);
        let mut out = Vec::new();

        renderer.draw(&mut out, &frame).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), renderer.render(&frame));
    }

    #[test]
    fn test_draw_with_clear_emits_escape() {
        let renderer = TrackRenderer::new(10);
        let frame = snapshot(vec![lane(1, 3, LaneStatus::Advancing)]);
        let mut out = Vec::new();

        renderer.draw(&mut out, &frame).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('\u{1b}'));
        assert!(text.ends_with(&renderer.render(&frame)));
    }
}
