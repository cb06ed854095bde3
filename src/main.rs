use std::io::{Stdout, Write, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEventKind},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use selecttree::color::{self, ColorLevel};
use selecttree::demo::{self, GameId};
use selecttree::event::{ClickTracker, DialogEvent, translate};
use selecttree::tree::{Canvas, DialogHost, SelectTree, SelectTreeOptions, TreeData};
use selecttree::tui::{
    Component,
    canvas::TerminalCanvas,
    preview::PreviewComponent,
    screen::{DialogLayout, composite},
    status::StatusComponent,
    terminal_buffer::TerminalBuffer,
};
use selecttree::{TreeStyle, ViewportConfig};

const HINTS: &str = "click: select/expand  double-click/enter: play  r: reopen  q: quit";

fn main() -> Result<()> {
    // The terminal belongs to the dialog, so logs go to selecttree.log
    let log_file = tracing_appender::rolling::never(".", "selecttree.log");
    let (log_writer, _log_guard) = tracing_appender::non_blocking(log_file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_writer(log_writer)
        .with_ansi(false)
        .init();

    info!("selecttree starting");

    // Enter alternate screen buffer and enable raw mode
    terminal::enable_raw_mode()?;
    stdout()
        .execute(EnterAlternateScreen)?
        .execute(EnableMouseCapture)?;

    let mut data = TreeData::new(demo::game_tree());
    let result = run(&mut data);

    // Always restore terminal state, even if run() fails
    stdout()
        .execute(LeaveAlternateScreen)?
        .execute(DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    match result? {
        Some(id) => {
            let name = demo::find(id).map(|game| game.name).unwrap_or("unknown game");
            info!("chosen game {id}");
            println!("Starting {name}");
        }
        None => println!("No game chosen"),
    }

    info!("selecttree shutting down");
    Ok(())
}

/// Host side of the game dialog.
#[derive(Default)]
struct GameDialog {
    preview: Option<GameId>,
    committed: Option<usize>,
}

impl DialogHost<GameId> for GameDialog {
    fn update_preview(&mut self, key: &GameId) {
        info!("preview game {key}");
        self.preview = Some(*key);
    }

    fn commit(&mut self, default: usize) {
        info!("dialog committed with button {default}");
        self.committed = Some(default);
    }
}

enum SessionEnd {
    Play,
    Cancel,
    Reopen,
}

/// Open the dialog until a game is chosen or the user gives up. Every
/// reopen is a fresh tree session over the same `data`.
fn run(data: &mut TreeData<GameId>) -> Result<Option<GameId>> {
    let mut out = stdout();
    let level = color::color_level();
    let mut selection: Option<GameId> = None;

    loop {
        let (width, height) = terminal::size()?;
        let config = ViewportConfig {
            width: (width as u32 * 3 / 5).max(1),
            screen_height: Some(height as u32),
            breakpoints: vec![(0, 10), (30, 20), (45, 30)],
            style: TreeStyle::cells(),
            ..Default::default()
        };
        let layout = DialogLayout::new(width, height, config.width as u16, config.visible_rows() as u16);
        let mut canvas = TerminalCanvas::new(layout.tree.width, layout.tree.height)
            .with_colors(level != ColorLevel::None);
        let mut dialog = GameDialog {
            preview: selection,
            committed: None,
        };
        let options = SelectTreeOptions {
            config,
            symbols: color::symbol_set(level),
            selection,
            default_button: 0,
        };

        out.execute(Clear(ClearType::All))?;
        let mut tree = SelectTree::new(data, &mut canvas, options)?;
        let end = session(&mut out, &mut tree, &mut dialog, layout)?;
        selection = tree.selection_key().copied();
        drop(tree);

        match end {
            SessionEnd::Play => return Ok(selection),
            SessionEnd::Cancel => return Ok(None),
            SessionEnd::Reopen => info!("reopening game dialog"),
        }
    }
}

fn session(
    out: &mut Stdout,
    tree: &mut SelectTree<'_, GameId, TerminalCanvas>,
    dialog: &mut GameDialog,
    layout: DialogLayout,
) -> Result<SessionEnd> {
    let mut clicks = ClickTracker::default();
    loop {
        let loading = tree.is_loading();
        paint(out, tree, dialog, layout, loading)?;

        // Keep repainting while a background branch is still loading.
        if loading && !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match translate(event::read()?, &mut clicks, Instant::now()) {
            Some(DialogEvent::Click(kind, column, row)) => {
                if let Some(at) = layout.tree.local(column, row) {
                    tree.click(kind, at, dialog);
                }
                if dialog.committed.is_some() {
                    return Ok(SessionEnd::Play);
                }
            }
            Some(DialogEvent::Scroll(rows)) => tree.canvas_mut().scroll_by(0, rows),
            Some(DialogEvent::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(SessionEnd::Cancel),
                KeyCode::Char('r') => return Ok(SessionEnd::Reopen),
                KeyCode::Enter if tree.selected().is_some() => return Ok(SessionEnd::Play),
                KeyCode::Left => tree.canvas_mut().scroll_by(-1, 0),
                KeyCode::Right => tree.canvas_mut().scroll_by(1, 0),
                _ => {}
            },
            Some(DialogEvent::Resize(..)) => return Ok(SessionEnd::Reopen),
            Some(DialogEvent::Key(_)) | None => {}
        }
    }
}

fn paint(
    out: &mut Stdout,
    tree: &SelectTree<'_, GameId, TerminalCanvas>,
    dialog: &GameDialog,
    layout: DialogLayout,
    loading: bool,
) -> Result<()> {
    let mut buffer = TerminalBuffer::new(layout.tree.width, layout.tree.height);
    tree.canvas().render(&mut buffer)?;
    composite(out, &buffer, layout.tree)?;

    let mut buffer = TerminalBuffer::new(layout.preview.width, layout.preview.height);
    PreviewComponent::new(dialog.preview.and_then(demo::find)).render(&mut buffer)?;
    composite(out, &buffer, layout.preview)?;

    let (first, last) = tree.canvas().yview();
    let mut message = HINTS.to_string();
    if last - first < 1.0 {
        message.push_str(&format!("  [{:.0}%]", first * 100.0));
    }
    if loading {
        message.push_str("  loading...");
    }
    let mut buffer = TerminalBuffer::new(layout.status.width, layout.status.height);
    StatusComponent::new(message).render(&mut buffer)?;
    composite(out, &buffer, layout.status)?;

    out.flush()?;
    Ok(())
}
