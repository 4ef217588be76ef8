/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout: the board sits at the top-left, one grid cell = two terminal
/// columns; the two rows under it hold the score bar.

use std::io::{self, BufWriter, Write};
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::food::FoodKind;
use crate::domain::grid::{Bounds, Direction};
use crate::domain::snake::GameOverReason;
use crate::sim::world::{Mode, WorldState};

// ── Palette ──

const BACKGROUND: Color = Color::Rgb { r: 255, g: 235, b: 243 };
const GRID_ALT: Color = Color::Rgb { r: 255, g: 222, b: 236 };
const SNAKE_HEAD: Color = Color::Rgb { r: 76, g: 187, b: 23 };
const SNAKE_BODY1: Color = Color::Rgb { r: 102, g: 204, b: 0 };
const SNAKE_BODY2: Color = Color::Rgb { r: 153, g: 255, b: 51 };
const SCORE_BG: Color = Color::Rgb { r: 255, g: 255, b: 255 };
const SCORE_TEXT: Color = Color::Rgb { r: 255, g: 102, b: 102 };
const OVERLAY_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const GAME_OVER_TEXT: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const PAUSE_TEXT: Color = Color::Rgb { r: 100, g: 160, b: 255 };
const LEVEL_UP_TEXT: Color = Color::Rgb { r: 0, g: 200, b: 0 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Color::Reset };

    /// Sentinel used to invalidate the back buffer so every cell is re-sent.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Centre `s` horizontally within `[0, span)`.
    fn put_centered(&mut self, span: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        self.put_str(span.saturating_sub(len) / 2, y, s, fg, bg);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Rows under the board: separator + score line.
const SCORE_ROWS: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_mode: Option<Mode>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_mode: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Largest board that fits the terminal, leaving room for the score bar.
    pub fn fit_grid(&self) -> Bounds {
        fit_grid(self.term_w, self.term_h)
    }

    pub fn render(&mut self, world: &WorldState, now: Duration) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, ResetColor, Clear(ClearType::All))?;
        }

        // Mode change → clear for clean transition
        if self.last_mode != Some(world.mode) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, ResetColor, Clear(ClearType::All))?;
            self.last_mode = Some(world.mode);
        }

        self.front.clear();

        match world.mode {
            Mode::StartMenu => self.compose_start_menu(world),
            Mode::Playing => self.compose_game(world, now),
            Mode::Paused => {
                self.compose_game(world, now);
                self.compose_pause_overlay(world);
            }
            Mode::GameOver { .. } => {
                self.compose_game(world, now);
                self.compose_game_over(world);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Color::Reset;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn board_cols(&self, w: &WorldState) -> usize {
        (w.bounds.width as usize * CELL_W).min(self.front.width)
    }

    fn compose_game(&mut self, w: &WorldState, now: Duration) {
        let (bw, bh) = (w.bounds.width as usize, w.bounds.height as usize);

        // Board background with a faint checker for the grid
        for gy in 0..bh {
            for gx in 0..bw {
                let bg = if (gx + gy) % 2 == 0 { BACKGROUND } else { GRID_ALT };
                self.put_grid_cell(gx, gy, [' ', ' '], Color::White, bg);
            }
        }

        self.compose_food(w, now);
        self.compose_snake(w);
        self.compose_score_bar(w, now);

        if w.mode == Mode::Playing && w.level_banner_visible(now) {
            let text = format!(" Level Up! {} ", w.level);
            let cols = self.board_cols(w);
            self.front.put_centered(cols, bh / 4, &text, LEVEL_UP_TEXT, SCORE_BG);
        }
    }

    fn compose_food(&mut self, w: &WorldState, now: Duration) {
        let food = &w.food;
        let (gx, gy) = (food.position.x as usize, food.position.y as usize);
        let bg = if (gx + gy) % 2 == 0 { BACKGROUND } else { GRID_ALT };

        // Spawn-in: a dot until the food has grown past half size
        if food.spawn_scale(now) < 0.5 {
            self.put_grid_cell(gx, gy, ['·', ' '], food_color(food.kind), bg);
            return;
        }
        let glyph = match food.kind {
            FoodKind::Basic => '●',
            FoodKind::Special => '◆',
            FoodKind::Rare => '♥',
            FoodKind::PowerUp => '★',
        };
        self.put_grid_cell(gx, gy, [glyph, ' '], food_color(food.kind), bg);
    }

    fn compose_snake(&mut self, w: &WorldState) {
        let powered = w.snake.power_up_active();
        for (i, pos) in w.snake.body().iter().enumerate() {
            let base = if i == 0 {
                SNAKE_HEAD
            } else if i % 2 == 0 {
                SNAKE_BODY1
            } else {
                SNAKE_BODY2
            };
            let bg = if powered { lighten(base, 50) } else { base };
            let chars = if i == 0 { eyes(w.snake.direction()) } else { [' ', ' '] };
            self.put_grid_cell(pos.x as usize, pos.y as usize, chars, Color::Black, bg);
        }
    }

    fn compose_score_bar(&mut self, w: &WorldState, now: Duration) {
        let row = w.bounds.height as usize;
        let cols = self.board_cols(w).max(1);
        for x in 0..cols {
            self.front.set(x, row, Cell::new('─', Color::Grey, SCORE_BG));
        }
        self.front.fill_rect(0, row + 1, cols, 1, SCORE_BG);

        let mut text = format!(
            "Score: {}  High Score: {}  Level: {}",
            w.snake.score, w.high_score(), w.level,
        );
        if let Some(until) = w.snake.power_up_until() {
            let left = until.saturating_sub(now).as_secs_f32().ceil();
            text.push_str(&format!("  ★ BOOST {left:.0}s"));
        }
        self.front.put_centered(cols, row + 1, &text, SCORE_TEXT, SCORE_BG);
    }

    fn compose_start_menu(&mut self, w: &WorldState) {
        let cols = self.front.width;
        let top = self.front.height / 4;

        self.front.put_centered(cols, top, "S N A K E   A R C A D E", SCORE_TEXT, Color::Reset);
        self.front.put_centered(cols, top + 3, "Press SPACE to Start", Color::White, Color::Reset);

        let instructions = [
            "Use ARROW KEYS or WASD to move",
            "Eat food to grow and score",
            "Avoid walls and yourself",
            "P to pause, SPACE to restart",
            "Gold ★ power-up boosts speed",
            "ESC or Q to quit",
        ];
        for (i, line) in instructions.iter().enumerate() {
            self.front.put_centered(cols, top + 5 + i, line, Color::DarkGrey, Color::Reset);
        }

        if w.high_score() > 0 {
            let hs = format!("High Score: {}", w.high_score());
            self.front.put_centered(cols, top + 6 + instructions.len(), &hs, SCORE_TEXT, Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let cols = self.board_cols(w);
        let (box_w, box_h) = (30_usize.min(cols), 5);
        let box_x = cols.saturating_sub(box_w) / 2;
        let box_y = (w.bounds.height as usize).saturating_sub(box_h) / 2;

        self.front.fill_rect(box_x, box_y, box_w, box_h, OVERLAY_BG);
        self.front.put_centered(cols, box_y + 1, "PAUSED", PAUSE_TEXT, OVERLAY_BG);
        self.front.put_centered(cols, box_y + 3, "Press P to continue", PAUSE_TEXT, OVERLAY_BG);
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let cols = self.board_cols(w);
        let (box_w, box_h) = (48_usize.min(cols), 9);
        let box_x = cols.saturating_sub(box_w) / 2;
        let box_y = (w.bounds.height as usize).saturating_sub(box_h) / 2;

        let title = match w.game_over_reason() {
            Some(GameOverReason::BoardCleared) => "YOU WIN!",
            _ => "GAME OVER!",
        };
        let reason = w.game_over_reason().map(|r| r.label()).unwrap_or("");

        self.front.fill_rect(box_x, box_y, box_w, box_h, OVERLAY_BG);
        self.front.put_centered(cols, box_y + 1, title, GAME_OVER_TEXT, OVERLAY_BG);
        self.front.put_centered(cols, box_y + 3, &format!("Reason: {reason}"), GAME_OVER_TEXT, OVERLAY_BG);
        let scores = format!("Final Score: {}  High Score: {}", w.snake.score, w.high_score());
        self.front.put_centered(cols, box_y + 4, &scores, Color::White, OVERLAY_BG);
        self.front.put_centered(cols, box_y + 6, "SPACE to play again, ESC to exit", Color::Grey, OVERLAY_BG);
    }

    fn put_grid_cell(&mut self, gx: usize, gy: usize, chars: [char; 2], fg: Color, bg: Color) {
        let col = gx * CELL_W;
        self.front.set(col, gy, Cell::new(chars[0], fg, bg));
        self.front.set(col + 1, gy, Cell::new(chars[1], fg, bg));
    }
}

fn fit_grid(term_w: usize, term_h: usize) -> Bounds {
    let w = term_w / CELL_W;
    let h = term_h.saturating_sub(SCORE_ROWS);
    Bounds::new(w as i32, h as i32)
}

fn food_color(kind: FoodKind) -> Color {
    match kind {
        FoodKind::Basic => Color::Rgb { r: 255, g: 0, b: 0 },
        FoodKind::Special => Color::Rgb { r: 0, g: 0, b: 255 },
        FoodKind::Rare => Color::Rgb { r: 255, g: 51, b: 153 },
        FoodKind::PowerUp => Color::Rgb { r: 255, g: 180, b: 0 },
    }
}

/// Two eye glyphs for the head, looking the way it moves.
fn eyes(dir: Direction) -> [char; 2] {
    match dir {
        Direction::Left => ['•', ' '],
        Direction::Right => [' ', '•'],
        Direction::Up => ['˙', '˙'],
        Direction::Down => ['.', '.'],
    }
}

fn lighten(c: Color, by: u8) -> Color {
    match c {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: r.saturating_add(by),
            g: g.saturating_add(by),
            b: b.saturating_add(by),
        },
        other => other,
    }
}
