//! Plays a machine on the terminal at its step delay, with pause, rerun and
//! quit keys.

use std::time::Duration;

use stepviz_core::{Clock, Machine, Point, Range, RunReport, Session, Stepper, SystemClock, Tick};
use stepviz_term::draw::draw_status;
use stepviz_term::{Canvas, Input, Terminal, palette};

use crate::error::DemoError;

/// Longest wait between two input polls.
pub const FRAME: Duration = Duration::from_millis(16);

/// What an input handler asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Restart,
}

/// How a played run ended.
#[derive(Debug)]
pub enum Played<S, T> {
    Finished { snapshot: S, report: RunReport<T> },
    Quit,
    Restart,
}

/// The area between the title row and the status row.
pub fn body(c: &Canvas) -> Range {
    Range::new(0, 1, c.width(), (c.height() - 1).max(1))
}

/// Row used for status text.
pub fn status_row(c: &Canvas) -> i32 {
    c.height() - 1
}

/// Time to block on input before the next step is due.
fn wait_for(due: Duration, now: Duration, paused: bool) -> Duration {
    if paused {
        FRAME
    } else {
        due.saturating_sub(now).min(FRAME)
    }
}

fn render<S, D>(term: &mut Terminal, draw: &mut D, snap: &S, paused: bool) -> Result<(), DemoError>
where
    D: FnMut(&mut Canvas, &S),
{
    let mut c = term.canvas()?;
    draw(&mut c, snap);
    if paused {
        let x = (c.width() - 8).max(0);
        c.text(Point::new(x, 0), " PAUSED ", palette::STATUS);
    }
    term.present(&c)?;
    Ok(())
}

/// Runs `machine` to its end, redrawing after every step.
///
/// The run is begun on `session`, superseding whatever ran before. Space
/// toggles pause, `r` asks for a rerun and `q` or Escape stops the run.
/// Other input goes to `on_input`.
pub fn play<M, D, I>(
    term: &mut Terminal,
    session: &mut Session,
    machine: M,
    delay: Duration,
    mut draw: D,
    mut on_input: I,
) -> Result<Played<M::Snapshot, M::Output>, DemoError>
where
    M: Machine,
    D: FnMut(&mut Canvas, &M::Snapshot),
    I: FnMut(Input) -> Control,
{
    let mut last = machine.snapshot();
    let mut stepper = Stepper::with_context(machine, delay, session.begin());
    let clock = SystemClock::new();
    let mut paused = false;
    render(term, &mut draw, &last, paused)?;

    loop {
        if !paused {
            match stepper.poll(clock.now()) {
                Some(Tick::Snapshot(s)) => {
                    last = s;
                    render(term, &mut draw, &last, paused)?;
                }
                Some(Tick::Finished { snapshot, report }) => {
                    render(term, &mut draw, &snapshot, false)?;
                    return Ok(Played::Finished { snapshot, report });
                }
                Some(Tick::Cancelled) => return Ok(Played::Quit),
                Some(Tick::Failed(err)) => return Err(err.into()),
                None => {}
            }
        }

        let wait = wait_for(stepper.due(), clock.now(), paused);
        let Some(input) = term.poll_input(wait)? else {
            continue;
        };
        let control = match input {
            Input::Char(' ') => {
                paused = !paused;
                log::debug!("paused: {paused}");
                render(term, &mut draw, &last, paused)?;
                Control::Continue
            }
            Input::Resize { .. } => {
                render(term, &mut draw, &last, paused)?;
                Control::Continue
            }
            Input::Char('r') => Control::Restart,
            i if i.is_quit() => Control::Quit,
            other => on_input(other),
        };
        match control {
            Control::Continue => {}
            Control::Quit => {
                session.cancel();
                return Ok(Played::Quit);
            }
            Control::Restart => {
                session.cancel();
                return Ok(Played::Restart);
            }
        }
    }
}

/// Keeps a finished picture on screen until the user reruns or quits.
pub fn hold<D>(term: &mut Terminal, mut draw: D) -> Result<Control, DemoError>
where
    D: FnMut(&mut Canvas),
{
    let mut redraw = true;
    loop {
        if redraw {
            let mut c = term.canvas()?;
            draw(&mut c);
            term.present(&c)?;
            redraw = false;
        }
        match term.poll_input(FRAME * 4)? {
            Some(Input::Char('r')) => return Ok(Control::Restart),
            Some(i) if i.is_quit() => return Ok(Control::Quit),
            Some(Input::Resize { .. }) => redraw = true,
            _ => {}
        }
    }
}

/// Plays fresh machines until the user quits.
///
/// `make` builds the machine for the given run number and returns it with
/// a title line. After each finished run the final snapshot stays on screen
/// with `summary` of the report in the status row.
pub fn replay<M, F, D, S>(
    term: &mut Terminal,
    delay: Duration,
    mut make: F,
    mut draw: D,
    summary: S,
) -> Result<(), DemoError>
where
    M: Machine,
    F: FnMut(u64) -> Result<(M, String), DemoError>,
    D: FnMut(&mut Canvas, &str, &M::Snapshot),
    S: Fn(&RunReport<M::Output>) -> String,
{
    let mut session = Session::new();
    let mut run = 0;
    loop {
        let (machine, title) = make(run)?;
        log::info!("run {run}: {title}");
        let played = play(
            term,
            &mut session,
            machine,
            delay,
            |c: &mut Canvas, s: &M::Snapshot| draw(c, &title, s),
            |_| Control::Continue,
        )?;
        match played {
            Played::Finished { snapshot, report } => {
                let line = format!("{}   r rerun  q quit", summary(&report));
                log::info!("{}", summary(&report));
                let control = hold(term, |c| {
                    draw(c, &title, &snapshot);
                    let y = status_row(c);
                    draw_status(c, y, &line);
                })?;
                if control == Control::Quit {
                    return Ok(());
                }
            }
            Played::Quit => return Ok(()),
            Played::Restart => {}
        }
        run += 1;
    }
}
