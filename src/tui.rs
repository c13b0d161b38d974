use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::time::{Interval, MissedTickBehavior};

use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enters raw mode and the alternate screen. A panic restores the terminal first.
pub fn init() -> Result<Tui> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));

    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(io::stdout())).context("failed to create terminal")
}

pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Merges terminal input with a periodic tick so async results get drawn.
pub struct EventHandler {
    stream: EventStream,
    tick: Interval,
}

impl EventHandler {
    pub fn new(tick_ms: u64) -> Self {
        let mut tick = tokio::time::interval(Duration::from_millis(tick_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            stream: EventStream::new(),
            tick,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            tokio::select! {
                _ = self.tick.tick() => return Ok(Event::Tick),
                maybe = self.stream.next() => match maybe {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        return Ok(Event::Key(key));
                    }
                    Some(Ok(CrosstermEvent::Resize(_, _))) => return Ok(Event::Resize),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e).context("failed to read terminal event"),
                    None => anyhow::bail!("terminal event stream closed"),
                },
            }
        }
    }
}
