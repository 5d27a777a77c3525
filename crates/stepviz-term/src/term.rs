//! The crossterm terminal: alternate screen setup, diffed flushing and input.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind},
    queue,
    style::{self, Attribute, Color as CtColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use stepviz_core::Point;

use crate::canvas::{Canvas, Frame, compute_frame};
use crate::style::{AttrMask, Color};

fn to_ct_color(c: Color) -> CtColor {
    if c == Color::DEFAULT {
        CtColor::Reset
    } else {
        CtColor::Rgb {
            r: c.r(),
            g: c.g(),
            b: c.b(),
        }
    }
}

/// User input the front ends react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    Escape,
    Enter,
    /// Main button pressed at a screen position.
    Click(Point),
    /// Pointer moved with the main button held.
    Drag(Point),
    Resize { width: i32, height: i32 },
}

impl Input {
    /// `q`, `Q` and Escape.
    pub fn is_quit(self) -> bool {
        matches!(self, Self::Escape | Self::Char('q') | Self::Char('Q'))
    }
}

/// Owns the terminal while a front end runs.
///
/// [`init`](Terminal::init) switches to raw mode on the alternate screen;
/// [`close`](Terminal::close), also called on drop, restores the terminal.
pub struct Terminal {
    prev: Canvas,
    mouse_enabled: bool,
    active: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            prev: Canvas::new(0, 0),
            mouse_enabled: true,
            active: false,
        }
    }

    /// Configure whether mouse events are captured.
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        if self.mouse_enabled {
            queue!(stdout, event::EnableMouseCapture)?;
        }
        stdout.flush()?;
        self.active = true;
        log::debug!("terminal initialised");
        Ok(())
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> io::Result<(i32, i32)> {
        let (w, h) = terminal::size()?;
        Ok((w as i32, h as i32))
    }

    /// A blank canvas matching the terminal.
    pub fn canvas(&self) -> io::Result<Canvas> {
        let (w, h) = self.size()?;
        Ok(Canvas::new(w, h))
    }

    /// Sends the glyphs that changed since the last present.
    pub fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        let frame = compute_frame(&self.prev, canvas);
        if !frame.is_empty() {
            Self::flush(&frame)?;
        }
        self.prev = canvas.clone();
        Ok(())
    }

    fn flush(frame: &Frame) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for fc in &frame.cells {
            let p = fc.pos;
            let st = fc.glyph.style;
            queue!(
                stdout,
                cursor::MoveTo(p.x as u16, p.y as u16),
                SetForegroundColor(to_ct_color(st.fg)),
                SetBackgroundColor(to_ct_color(st.bg))
            )?;
            let attrs = st.attrs;
            if attrs.contains(AttrMask::BOLD) {
                queue!(stdout, style::SetAttribute(Attribute::Bold))?;
            }
            if attrs.contains(AttrMask::REVERSE) {
                queue!(stdout, style::SetAttribute(Attribute::Reverse))?;
            }
            if attrs.contains(AttrMask::DIM) {
                queue!(stdout, style::SetAttribute(Attribute::Dim))?;
            }
            write!(stdout, "{}", fc.glyph.ch)?;
            if !attrs.is_empty() {
                queue!(stdout, style::SetAttribute(Attribute::Reset))?;
            }
        }
        stdout.flush()
    }

    /// Waits up to `timeout` for one input event.
    pub fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<Input>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let input = match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                match code {
                    KeyCode::Char(c) => Some(Input::Char(c)),
                    KeyCode::Esc => Some(Input::Escape),
                    KeyCode::Enter => Some(Input::Enter),
                    _ => None,
                }
            }
            Event::Mouse(me) => {
                let pos = Point::new(me.column as i32, me.row as i32);
                match me.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(Input::Click(pos)),
                    MouseEventKind::Drag(MouseButton::Left) => Some(Input::Drag(pos)),
                    _ => None,
                }
            }
            Event::Resize(w, h) => {
                // Force a full repaint on the next present.
                self.prev = Canvas::new(0, 0);
                let mut stdout = io::stdout();
                queue!(stdout, terminal::Clear(ClearType::All))?;
                Some(Input::Resize {
                    width: w as i32,
                    height: h as i32,
                })
            }
            _ => None,
        };
        Ok(input)
    }

    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = queue!(stdout, event::DisableMouseCapture);
        }
        let _ = queue!(
            stdout,
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
        log::debug!("terminal restored");
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.close();
    }
}
