use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;
use tracing::info;

use crate::audio::{bin_frequency, AudioStream, SpectrumAnalyzer};
use crate::config::Config;
use crate::renderer::{self, Canvas, RenderParams};

/// Session lifecycle. Stopped is terminal: reaching it ends the loop and
/// releases the device and display on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Running,
    Stopped,
}

pub fn run(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_session(&mut terminal, config);

    // Restore terminal on every exit path, fatal or normal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_session(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> Result<()> {
    // Device open failure is fatal before the first iteration.
    let stream = AudioStream::open(&config.audio).context("Failed to open audio device")?;

    let mut analyzer = SpectrumAnalyzer::new(&config);
    let range = analyzer.range();
    let mut canvas = Canvas::new(config.render.width, config.render.height);

    let params = RenderParams {
        color_scheme: &config.render.color_scheme,
        labels: config.render.labels,
        label_step_hz: config.render.label_step_hz,
        freq_lo: bin_frequency(range.min, config.audio.block_size, config.audio.sample_rate),
        freq_hi: bin_frequency(range.max, config.audio.block_size, config.audio.sample_rate),
    };

    let mut block = vec![0i16; config.audio.block_size];
    let mut gained = Vec::with_capacity(config.audio.block_size);

    info!(
        "Streaming started: {} bins covering {:.0}-{:.0} Hz",
        range.len(),
        params.freq_lo,
        params.freq_hi
    );

    let mut state = SessionState::Running;
    while state == SessionState::Running {
        // The blocking read paces the whole loop at one block period.
        stream.read_block(&mut block).context("Audio read failed")?;

        analyzer.apply_gain(&block, &mut gained);
        if config.audio.passthrough {
            stream.write_block(&gained).context("Audio write failed")?;
        }

        let magnitudes = analyzer.magnitudes(&gained);
        renderer::render_frame(&mut canvas, &magnitudes, &params);
        present(terminal, &canvas)?;

        if poll_exit()? {
            info!("Exit requested");
            state = SessionState::Stopped;
        }
    }

    Ok(())
}

/// Present the canvas as half-block cells: each character shows two
/// vertically stacked pixels ('▀' with fg = upper, bg = lower).
fn present(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    canvas: &Canvas,
) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }

        let rows = area.height as usize;
        let cols = area.width as usize;

        for row in 0..rows {
            for col in 0..cols {
                // Nearest-neighbor sample of the canvas
                let x = col * canvas.width / cols;
                let y_top = (row * 2) * canvas.height / (rows * 2);
                let y_bottom = (row * 2 + 1) * canvas.height / (rows * 2);

                let (tr, tg, tb) = canvas.get_pixel(x, y_top);
                let (br, bg, bb) = canvas.get_pixel(x, y_bottom);

                let cell = frame
                    .buffer_mut()
                    .cell_mut((area.x + col as u16, area.y + row as u16));
                if let Some(cell) = cell {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    })?;
    Ok(())
}

/// Poll for an exit request with a short bounded wait, so the loop period
/// stays dominated by the audio block duration rather than input polling.
fn poll_exit() -> Result<bool> {
    if event::poll(Duration::from_millis(1))? {
        if let Event::Key(key) = event::read()? {
            match key {
                KeyEvent {
                    code: KeyCode::Char('q'),
                    ..
                }
                | KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => return Ok(true),
                _ => {}
            }
        }
    }
    Ok(false)
}
