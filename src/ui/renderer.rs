/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with `back` (the previous frame)
///   3. Queue terminal commands only for cells that changed
///   4. Flush once, then swap front/back
///
/// The world (480 × 640 units by default) is mapped onto the largest
/// terminal rectangle that keeps its aspect ratio, assuming a terminal
/// cell is twice as tall as it is wide.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Pose;
use crate::domain::physics::Aabb;
use crate::sim::end::{GAME_OVER_TEXT, RESTART_HINT};
use crate::sim::world::{score_label, Phase, WorldState};

/// Terminal cell height / width.
const CELL_ASPECT: f32 = 2.0;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell; forces a full repaint.
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

    fn bg_at(&self, x: usize, y: usize) -> Color {
        self.get(x, y).bg
    }

    /// Write a string keeping whatever background is already there.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i;
            if cx >= self.width { break; }
            let bg = self.bg_at(cx, y);
            self.set(cx, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_str_centered(&mut self, centre_x: usize, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(centre_x.saturating_sub(len / 2), y, s, fg);
    }
}

// ── Viewport: world units → terminal cells ──

/// Placement of the world view inside the terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    left: usize,
    top: usize,
    cols: usize,
    rows: usize,
    cells_per_unit_x: f32,
    cells_per_unit_y: f32,
}

/// Cell-space rectangle, half-open: [c0, c1) × [r0, r1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRect {
    c0: usize,
    r0: usize,
    c1: usize,
    r1: usize,
}

impl Viewport {
    fn fit(term_w: usize, term_h: usize, view_w: f32, view_h: f32) -> Self {
        let mut rows = term_h.max(1);
        let mut cols = ((rows as f32) * (view_w / view_h) * CELL_ASPECT).round() as usize;
        if cols > term_w {
            cols = term_w.max(1);
            rows = (((cols as f32) / CELL_ASPECT) * (view_h / view_w)).round().max(1.0) as usize;
        }
        Viewport {
            left: (term_w.saturating_sub(cols)) / 2,
            top: (term_h.saturating_sub(rows)) / 2,
            cols,
            rows,
            cells_per_unit_x: cols as f32 / view_w,
            cells_per_unit_y: rows as f32 / view_h,
        }
    }

    /// Project a world box seen through the camera. Clipped to the view;
    /// `None` if entirely outside. Every visible box covers at least one cell.
    fn project(&self, b: &Aabb, scroll_x: f32, scroll_y: f32) -> Option<CellRect> {
        let x0 = ((b.min_x - scroll_x) * self.cells_per_unit_x).floor();
        let x1 = ((b.max_x - scroll_x) * self.cells_per_unit_x).ceil();
        let y0 = ((b.min_y - scroll_y) * self.cells_per_unit_y).floor();
        let y1 = ((b.max_y - scroll_y) * self.cells_per_unit_y).ceil();

        let c0 = x0.max(0.0) as usize;
        let r0 = y0.max(0.0) as usize;
        let c1 = (x1.min(self.cols as f32)).max(0.0) as usize;
        let r1 = (y1.min(self.rows as f32)).max(0.0) as usize;
        if c0 >= c1 || r0 >= r1 {
            return None;
        }
        Some(CellRect {
            c0: c0 + self.left,
            r0: r0 + self.top,
            c1: c1 + self.left,
            r1: r1 + self.top,
        })
    }
}

// ── Sprites (the preloaded asset table) ──

#[derive(Clone, Copy, Debug)]
struct Sprite {
    fill: char,
    edge: char,
    fg: Color,
    bg: Color,
}

struct Assets {
    background_top: (u8, u8, u8),
    background_bottom: (u8, u8, u8),
    platform: Sprite,
    bunny_stand: Sprite,
    bunny_jump: Sprite,
    carrot: Sprite,
}

impl Assets {
    fn preload() -> Self {
        Assets {
            background_top: (120, 190, 250),
            background_bottom: (205, 235, 255),
            platform: Sprite {
                fill: '▓',
                edge: '▀',
                fg: Color::Rgb { r: 90, g: 190, b: 70 },
                bg: Color::Rgb { r: 130, g: 90, b: 50 },
            },
            bunny_stand: Sprite {
                fill: '█',
                edge: '▀',
                fg: Color::Rgb { r: 250, g: 245, b: 240 },
                bg: Color::Rgb { r: 230, g: 200, b: 210 },
            },
            bunny_jump: Sprite {
                fill: '█',
                edge: '╱',
                fg: Color::Rgb { r: 250, g: 245, b: 240 },
                bg: Color::Rgb { r: 230, g: 200, b: 210 },
            },
            carrot: Sprite {
                fill: '▼',
                edge: '"',
                fg: Color::Rgb { r: 245, g: 130, b: 30 },
                bg: Color::Rgb { r: 60, g: 160, b: 60 },
            },
        }
    }

    /// Look up a sprite by logical asset name.
    fn sprite(&self, key: &str) -> Option<Sprite> {
        match key {
            "platform" => Some(self.platform),
            "bunny-stand" => Some(self.bunny_stand),
            "bunny-jump" => Some(self.bunny_jump),
            "carrot" => Some(self.carrot),
            _ => None,
        }
    }

    fn bunny(&self, pose: Pose) -> Sprite {
        self.sprite(pose.texture()).unwrap_or(self.bunny_stand)
    }

    fn sky(&self, t: f32) -> Color {
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        let (a, b) = (self.background_top, self.background_bottom);
        Color::Rgb { r: lerp(a.0, b.0), g: lerp(a.1, b.1), b: lerp(a.2, b.2) }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    assets: Assets,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            assets: Assets::preload(),
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        // Key release reports need the kitty keyboard protocol.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            match execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            ) {
                Ok(()) => self.keyboard_enhanced = true,
                Err(e) => log::warn!("keyboard enhancement rejected: {e}"),
            }
        }
        log::info!("key release events: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    /// True once the terminal accepted key release reporting.
    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.keyboard_enhanced = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        let vp = Viewport::fit(
            self.term_w, self.term_h,
            world.camera.view_w, world.camera.view_h,
        );

        self.front.clear();
        match world.phase {
            Phase::Playing => self.compose_play(world, &vp),
            Phase::GameOver => self.compose_game_over(world, &vp),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
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

    fn compose_background(&mut self, vp: &Viewport) {
        // Fixed to the screen: the sky never scrolls vertically.
        for r in 0..vp.rows {
            let t = r as f32 / vp.rows.max(1) as f32;
            let sky = self.assets.sky(t);
            for c in 0..vp.cols {
                self.front.set(vp.left + c, vp.top + r, Cell::new(' ', Color::White, sky));
            }
        }
    }

    /// Paint a sprite over a rect: `edge` on the row given by `edge_row`,
    /// `fill` elsewhere. Background comes from the sprite.
    fn paint(&mut self, rect: CellRect, sprite: Sprite, edge_row: usize) {
        for r in rect.r0..rect.r1 {
            for c in rect.c0..rect.c1 {
                let ch = if r == edge_row { sprite.edge } else { sprite.fill };
                self.front.set(c, r, Cell::new(ch, sprite.fg, sprite.bg));
            }
        }
    }

    fn compose_play(&mut self, w: &WorldState, vp: &Viewport) {
        self.compose_background(vp);
        let (sx, sy) = (w.camera.scroll_x, w.camera.scroll_y);

        for p in &w.platforms {
            let b = Aabb::centered(p.x, p.y, p.width, p.height);
            if let Some(rect) = vp.project(&b, sx, sy) {
                let sprite = self.assets.platform;
                self.paint(rect, sprite, rect.r0);
            }
        }

        for c in w.carrots.iter().filter(|c| c.visible) {
            let b = Aabb::centered(c.x, c.y, c.width, c.height);
            if let Some(rect) = vp.project(&b, sx, sy) {
                let sprite = self.assets.carrot;
                self.paint(rect, sprite, rect.r0);
            }
        }

        let pl = &w.player;
        let b = Aabb::centered(pl.x, pl.y, pl.width, pl.height);
        if let Some(rect) = vp.project(&b, sx, sy) {
            let sprite = self.assets.bunny(pl.pose);
            // feet on the bottom row
            self.paint(rect, sprite, rect.r1 - 1);
            if rect.r1 - rect.r0 > 2 && rect.c1 - rect.c0 > 2 {
                // eyes
                let eye_row = rect.r0 + 1;
                self.front.set(rect.c0 + 1, eye_row, Cell::new('•', Color::Black, sprite.bg));
                self.front.set(rect.c1 - 2, eye_row, Cell::new('•', Color::Black, sprite.bg));
            }
        }

        // Score text: top-centred, ignores scroll.
        let centre = vp.left + vp.cols / 2;
        self.front.put_str_centered(centre, vp.top, &w.score_text, Color::Black);
    }

    fn compose_game_over(&mut self, w: &WorldState, vp: &Viewport) {
        let centre_x = vp.left + vp.cols / 2;
        let centre_y = vp.top + vp.rows / 2;
        let banner = format!("  {}  ", GAME_OVER_TEXT);
        let rule: String = "═".repeat(banner.chars().count());
        let red = Color::Rgb { r: 255, g: 80, b: 80 };

        self.front.put_str_centered(centre_x, centre_y.saturating_sub(2), &rule, red);
        self.front.put_str_centered(centre_x, centre_y.saturating_sub(1), &banner, red);
        self.front.put_str_centered(centre_x, centre_y, &rule, red);

        let score = score_label(w.carrots_collected);
        self.front.put_str_centered(centre_x, centre_y + 2, &score, Color::White);
        self.front.put_str_centered(
            centre_x, centre_y + 4, RESTART_HINT, Color::Rgb { r: 80, g: 255, b: 80 },
        );
        self.front.put_str_centered(centre_x, centre_y + 5, "ESC: Quit", Color::DarkGrey);
    }
}
