use std::{
    fmt,
    io::{self, Stderr, Write as _},
};

use crossterm::{cursor, queue, style::Print, terminal};

use crate::environment::ACTION_MAX;

const FRAME_WIDTH: usize = 21;
const FRAME_HEIGHT: usize = 11;
const PIVOT_X: usize = FRAME_WIDTH / 2;
const PIVOT_Y: usize = FRAME_HEIGHT / 2;
const ROD_LENGTH: f32 = 4.0;
// terminal cells are roughly twice as tall as they are wide
const ASPECT: f32 = 2.0;
const ROD_SAMPLES: usize = 16;
const GAUGE_HALF_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum RenderCell {
    #[default]
    Empty,
    Rod,
    Bob,
    Pivot,
}

impl RenderCell {
    fn as_char(self) -> char {
        match self {
            RenderCell::Empty => ' ',
            RenderCell::Rod => '*',
            RenderCell::Bob => '@',
            RenderCell::Pivot => 'o',
        }
    }
}

/// Character-grid snapshot of a pendulum state.
///
/// The pivot sits in the middle of the grid; `θ = 0` draws the rod straight up.
/// A gauge line under the grid shows the last applied torque.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    cells: [[RenderCell; FRAME_WIDTH]; FRAME_HEIGHT],
    torque: Option<f32>,
}

impl RenderFrame {
    pub const WIDTH: usize = FRAME_WIDTH;
    pub const HEIGHT: usize = FRAME_HEIGHT;

    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn new(theta: f32, torque: Option<f32>) -> Self {
        let mut cells = [[RenderCell::Empty; FRAME_WIDTH]; FRAME_HEIGHT];
        let tip_dx = -theta.sin() * ROD_LENGTH * ASPECT;
        let tip_dy = -theta.cos() * ROD_LENGTH;

        for i in 1..=ROD_SAMPLES {
            let t = i as f32 / ROD_SAMPLES as f32;
            let x = (PIVOT_X as f32 + tip_dx * t).round() as isize;
            let y = (PIVOT_Y as f32 + tip_dy * t).round() as isize;
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(cell) = cells.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = if i == ROD_SAMPLES {
                    RenderCell::Bob
                } else {
                    RenderCell::Rod
                };
            }
        }
        cells[PIVOT_Y][PIVOT_X] = RenderCell::Pivot;

        Self { cells, torque }
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<RenderCell> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Position of the bob as `(x, y)`, if it lies inside the grid.
    #[must_use]
    pub fn bob_position(&self) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(|cell| cell.is_bob())
                .map(|x| (x, y))
        })
    }

    #[must_use]
    pub fn pivot_position() -> (usize, usize) {
        (PIVOT_X, PIVOT_Y)
    }

    /// Renders the torque gauge, e.g. `[    ####|        ]` for a negative torque.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn torque_gauge(&self) -> String {
        let mut left = [' '; GAUGE_HALF_WIDTH];
        let mut right = [' '; GAUGE_HALF_WIDTH];
        if let Some(torque) = self.torque {
            let ratio = (torque.abs() / ACTION_MAX).min(1.0);
            let filled = (ratio * GAUGE_HALF_WIDTH as f32).round() as usize;
            if torque < 0.0 {
                for c in left.iter_mut().rev().take(filled) {
                    *c = '#';
                }
            } else {
                for c in right.iter_mut().take(filled) {
                    *c = '#';
                }
            }
        }
        let left: String = left.iter().collect();
        let right: String = right.iter().collect();
        format!("[{left}|{right}]")
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect::<String>())
            .chain(std::iter::once(self.torque_gauge()))
    }
}

impl fmt::Display for RenderFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Draws [`RenderFrame`]s in place at the top of the terminal.
#[derive(Debug)]
pub struct TerminalRenderer {
    writer: Stderr,
}

impl TerminalRenderer {
    pub fn stderr() -> io::Result<Self> {
        let mut writer = io::stderr();
        queue!(writer, cursor::Hide)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn draw(&mut self, frame: &RenderFrame) -> io::Result<()> {
        queue!(
            self.writer,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::All)
        )?;
        for line in frame.lines() {
            queue!(self.writer, Print(line), cursor::MoveToNextLine(1))?;
        }
        self.writer.flush()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        queue!(self.writer, cursor::Show)?;
        self.writer.flush()
    }
}
