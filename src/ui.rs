//! Screen layout: the main view, the minimap, the status panel and the loading panel.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::Color,
    text::Line,
    widgets::{Block, BorderType, Clear, Paragraph, Widget as _},
    Frame,
};

use crate::{
    assets::ResourceSet,
    render::{self, BufferSink},
    session::Session,
    types::{PixelSize, VisibleRect},
};

/// Number of rows taken by the status panel, borders included.
const STATUS_HEIGHT: u16 = 5;

/// Converts a pixel length into terminal cells, saturating on overflow.
fn cells(pixels: usize) -> u16 {
    u16::try_from(pixels).unwrap_or(u16::MAX)
}

/// Builds a bordered panel in the style shared by every screen.
fn panel(title: &str) -> Block<'_> {
    Block::bordered()
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded)
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Returns the top-left part of `area` large enough for a bordered canvas of `size` pixels.
fn panel_area(area: Rect, size: PixelSize) -> Rect {
    let [column, _] = Layout::horizontal([
        Constraint::Length(cells(size.width).saturating_add(2)),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [panel, _] = Layout::vertical([
        Constraint::Length(cells(size.height).saturating_add(2)),
        Constraint::Fill(1),
    ])
    .areas(column);

    panel
}

/// Renders a bordered panel and returns a sink drawing into its inside.
fn canvas_panel<'buf>(
    buffer: &'buf mut Buffer,
    area: Rect,
    title: &str,
    size: PixelSize,
) -> BufferSink<'buf> {
    let area = panel_area(area, size);
    let block = panel(title);
    let inner = block.inner(area);
    block.render(area, buffer);

    BufferSink::new(buffer, inner, size)
}

/// Draws a running session.
///
/// The main view sits at the top left with the minimap to its right, both sized to their canvases.
/// The status panel spans the bottom of the screen. Panels that do not fit the terminal are
/// clipped.
pub(crate) fn draw_session(session: &Session, rect: VisibleRect, frame: &mut Frame) {
    clear(frame);

    let [world_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
            .areas(frame.area());
    let main_size = session.main_canvas_size();
    let [main_area, minimap_area] = Layout::horizontal([
        Constraint::Length(cells(main_size.width).saturating_add(2)),
        Constraint::Fill(1),
    ])
    .areas(world_area);

    let mut main = canvas_panel(frame.buffer_mut(), main_area, "Map", main_size);
    render::draw_main_view(
        &mut main,
        &session.grid,
        rect,
        &session.viewport,
        &session.resources,
    );
    render::draw_character(
        &mut main,
        &session.character,
        rect,
        &session.viewport,
        &session.resources,
    );

    let mut minimap = canvas_panel(
        frame.buffer_mut(),
        minimap_area,
        "Minimap",
        session.minimap_canvas_size(),
    );
    render::draw_minimap(
        &mut minimap,
        &session.grid,
        &session.visibility,
        &session.character,
        session.minimap_scale,
        &session.resources,
    );

    let lines = Vec::from(session.status_lines().map(Line::raw));
    let status = Paragraph::new(lines)
        .block(panel("Status").title_bottom("(arrows / hjkl) move / (q) quit"));
    frame.render_widget(status, status_area);
}

/// Draws the loading panel shown while sprites are still resolving.
///
/// The panel is centred on the screen and reports how many sprites resolved so far.
pub(crate) fn draw_loading(resources: &ResourceSet, frame: &mut Frame) {
    clear(frame);

    let resolved = resources.resolved();
    let total = resources.total();
    let percent = if total == 0 {
        100
    } else {
        rounded_div::i32(
            i32::try_from(resolved.saturating_mul(100)).unwrap_or(i32::MAX),
            i32::try_from(total).unwrap_or(i32::MAX),
        )
    };

    let [row] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Length(32)])
        .flex(Flex::Center)
        .areas(row);

    let progress = Line::raw(format!("Sprites: {resolved}/{total} ({percent}%)")).centered();
    frame.render_widget(Paragraph::new(progress).block(panel("Loading")), area);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::{
        assets::{Manifest, ResourceKey, Sprite},
        map::TileGrid,
        types::{TileType, ViewportSpec},
    };

    /// Creates a test terminal with known dimensions.
    fn create_test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(80, 24)).expect("failed to create test terminal")
    }

    /// Builds a two-by-two session with every sprite loaded.
    fn create_session() -> Session {
        let grid = TileGrid::new(vec![vec![0, 1], vec![1, 2]]).expect("failed to create grid");
        let (mut resources, sender) = ResourceSet::pending(Manifest::default().keys());
        for (key, glyph) in [
            (ResourceKey::Tile(TileType::Ladder), 'H'),
            (ResourceKey::Tile(TileType::Walkable), '.'),
            (ResourceKey::Tile(TileType::Unwalkable), '#'),
            (ResourceKey::Character, '@'),
        ] {
            let sprite = Sprite {
                glyph,
                fg: Color::White,
                bg: Color::Reset,
            };
            sender
                .send((key, Ok(sprite)))
                .expect("failed to send outcome");
        }
        assert!(resources.poll().is_some());

        Session::new(grid, ViewportSpec::new(2, 2, 1), 150, resources)
    }

    /// Returns the symbol drawn at a terminal position.
    fn symbol(terminal: &Terminal<TestBackend>, x: u16, y: u16) -> Option<String> {
        terminal
            .backend()
            .buffer()
            .cell((x, y))
            .map(|cell| cell.symbol().to_owned())
    }

    /// Returns the whole screen as a single string.
    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_session_places_canvases() {
        let mut session = create_session();
        let mut terminal = create_test_terminal();
        let rect = session.refresh_view();

        let result = terminal.draw(|frame| draw_session(&session, rect, frame));
        assert!(result.is_ok(), "drawing a session should succeed");

        // Main view inside the first panel, character over the ladder.
        assert_eq!(symbol(&terminal, 1, 1).as_deref(), Some("@"));
        assert_eq!(symbol(&terminal, 2, 1).as_deref(), Some("."));
        assert_eq!(symbol(&terminal, 2, 2).as_deref(), Some("#"));

        // Minimap inside the second panel, marker over the ladder.
        let marker = terminal.backend().buffer().cell((5, 1)).map(|cell| cell.bg);
        assert_eq!(marker, Some(render::CHARACTER_MARKER));
        assert_eq!(symbol(&terminal, 6, 1).as_deref(), Some("."));
        assert_eq!(symbol(&terminal, 6, 2).as_deref(), Some("#"));

        let text = screen(&terminal);
        assert!(text.contains("Ladder: 0, 0"));
        assert!(text.contains("Map: 2 x 2"));
        assert!(text.contains("Position: 0, 0"));
    }

    #[test]
    fn test_draw_session_larger_than_terminal() {
        let grid = TileGrid::default();
        let (resources, _sender) = ResourceSet::pending(Manifest::default().keys());
        let mut session = Session::new(grid, ViewportSpec::new(64, 48, 4), 150, resources);
        let mut terminal = create_test_terminal();
        let rect = session.refresh_view();

        let result = terminal.draw(|frame| draw_session(&session, rect, frame));

        assert!(result.is_ok(), "oversized canvases should be clipped");
    }

    #[test]
    fn test_draw_loading_reports_progress() {
        let (mut resources, sender) = ResourceSet::pending(Manifest::default().keys());
        let sprite = Sprite {
            glyph: '.',
            fg: Color::White,
            bg: Color::Reset,
        };
        sender
            .send((ResourceKey::Tile(TileType::Walkable), Ok(sprite)))
            .expect("failed to send outcome");
        assert!(resources.poll().is_none());
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| draw_loading(&resources, frame));
        assert!(result.is_ok(), "drawing the loading panel should succeed");

        assert!(screen(&terminal).contains("Sprites: 1/4 (25%)"));
    }

    #[test]
    fn test_cells_saturates() {
        assert_eq!(cells(12), 12);
        assert_eq!(cells(usize::MAX), u16::MAX);
    }
}
