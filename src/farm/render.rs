//! Wheat Farm rendering: half-block field, HUD, controls and dialogs.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::clock::Speed;
use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{progress_bar, ClickableList, TabBar};

use super::actions::*;
use super::land::PlotCoord;
use super::state::{Dialog, FIELD_PX};
use super::FarmGame;

const GRASS: Color = Color::Rgb(0xaa, 0xc5, 0x7a);
const COVER: Color = Color::Rgb(0x79, 0x47, 0x07);
const GROUND: [Color; 2] = [Color::Rgb(0x8b, 0x5a, 0x2b), Color::Rgb(0xb9, 0x7a, 0x46)];
const WHEAT: [Color; 4] = [
    Color::Rgb(0xdd, 0xa1, 0x5e),
    Color::Rgb(0xe8, 0xb8, 0x78),
    Color::Rgb(0xc9, 0x95, 0x54),
    Color::Rgb(0xf4, 0xe4, 0xc1),
];
/// Sprout colour per growing stage, darkening as the crop matures.
const SPROUT: [Color; 4] = [
    Color::Rgb(0xc2, 0xb2, 0x80),
    Color::Rgb(0x9a, 0xcd, 0x32),
    Color::Rgb(0x6b, 0x8e, 0x23),
    Color::Rgb(0x55, 0x6b, 0x2f),
];
const CURSOR_OWNED: Color = Color::Rgb(0x64, 0x96, 0xff);
const CURSOR_ADJACENT: Color = Color::Rgb(0x64, 0xff, 0x64);
const CURSOR_BLOCKED: Color = Color::Rgb(0xff, 0x64, 0x64);
const AMBER: Color = Color::Rgb(0xff, 0xb0, 0x00);

/// Terminal rows the field occupies inside its border.
const FIELD_ROWS: u16 = (FIELD_PX / 2) as u16;

pub fn render(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    if is_narrow_layout(area.width) {
        render_narrow(game, f, area, click_state);
    } else {
        render_wide(game, f, area, click_state);
    }
    if game.state.dialog != Dialog::None {
        render_dialog(game, f, area, click_state);
    }
}

fn render_wide(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FIELD_PX as u16 + 2), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Header
            Constraint::Length(FIELD_ROWS + 2), // Field
            Constraint::Length(3),              // Tractor pad
            Constraint::Length(3),              // Testing hooks
        ])
        .split(h_chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // Status
            Constraint::Length(3),  // Speed
            Constraint::Min(3),     // Log
        ])
        .split(h_chunks[1]);

    render_header(game, f, left[0]);
    render_field(game, f, left[1], click_state);
    render_pad(game, f, left[2], click_state);
    render_hooks(f, left[3], click_state);
    render_status(game, f, right[0], click_state);
    render_speed(game, f, right[1], click_state);
    render_log(game, f, right[2]);
}

fn render_narrow(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(FIELD_ROWS + 2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(11),
            Constraint::Min(3),
        ])
        .split(area);

    render_header(game, f, chunks[0]);
    render_field(game, f, chunks[1], click_state);
    render_pad(game, f, chunks[2], click_state);
    render_speed(game, f, chunks[3], click_state);
    render_status(game, f, chunks[4], click_state);
    render_log(game, f, chunks[5]);
}

fn render_header(game: &FarmGame, f: &mut Frame, area: Rect) {
    let mode = if game.state.land_cursor.active {
        Span::styled(" LAND ", Style::default().fg(Color::Black).bg(CURSOR_ADJACENT))
    } else if game.time.is_paused() {
        Span::styled(" PAUSED ", Style::default().fg(Color::Black).bg(Color::Yellow))
    } else {
        Span::raw("")
    };
    let line = Line::from(vec![
        Span::styled(
            "Wheat Farm ",
            Style::default().fg(WHEAT[0]).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("${:.2}", game.state.money),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        mode,
    ]);
    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(widget, area);
}

// ── Field ──────────────────────────────────────────────────────

/// Mask pixels (along one axis) whose centres fall in plot index `plot`.
fn plot_px_span(plot: i32, plot_size: f64, px_size: f64) -> Range<usize> {
    let inside = |i: usize| {
        let centre = (i as f64 + 0.5) * px_size;
        (centre / plot_size).floor() as i32 == plot
    };
    let first = (0..FIELD_PX).find(|&i| inside(i)).unwrap_or(FIELD_PX);
    let last = (first..FIELD_PX).take_while(|&i| inside(i)).last();
    match last {
        Some(l) => first..l + 1,
        None => first..first,
    }
}

fn cursor_color(game: &FarmGame, plot: PlotCoord) -> Color {
    if game.state.land_cursor.blocked_flash > 0 {
        CURSOR_BLOCKED
    } else if game.land.is_owned(plot) {
        CURSOR_OWNED
    } else if game.land.is_adjacent_to_owned(plot) {
        CURSOR_ADJACENT
    } else {
        CURSOR_BLOCKED
    }
}

fn pixel_color(game: &FarmGame, col: usize, row: usize) -> Color {
    let state = &game.state;
    let plot_size = game.config.plot_size;
    let (sx, sy) = state.cover.px_center(col, row);
    let plot = PlotCoord::containing(sx, sy, plot_size);

    if state.land_cursor.active && plot == state.land_cursor.plot {
        let on_edge = [(0i32, -1i32), (0, 1), (-1, 0), (1, 0)].iter().any(|&(dx, dy)| {
            let c = col as i32 + dx;
            let r = row as i32 + dy;
            if c < 0 || r < 0 || c >= FIELD_PX as i32 || r >= FIELD_PX as i32 {
                return true;
            }
            let (nx, ny) = state.cover.px_center(c as usize, r as usize);
            PlotCoord::containing(nx, ny, plot_size) != plot
        });
        if on_edge || state.land_cursor.blocked_flash % 4 >= 2 {
            return cursor_color(game, plot);
        }
    }

    if !game.land.is_owned(plot) {
        return GRASS;
    }

    if state.harvestable && state.cover.crop_standing(col, row) {
        return WHEAT[(row + col / 3) % WHEAT.len()];
    }
    if state.cover.soil_covered(col, row) {
        return COVER;
    }
    if let Some(stage) = game.farm.growth().stage_index() {
        if !state.harvestable && col % 3 == 1 && row % 3 == 1 {
            return SPROUT[stage.min(SPROUT.len() - 1)];
        }
    }
    GROUND[(row / 2) % 2]
}

fn render_field(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let px = game.state.cover.px_size();
    let tractor_col = ((game.state.tractor.x / px) as usize).min(FIELD_PX - 1);
    let tractor_row = ((game.state.tractor.y / px) as usize / 2).min(FIELD_PX / 2 - 1);
    let show_tractor = !game.state.land_cursor.active;

    let mut lines: Vec<Line> = Vec::with_capacity(FIELD_PX / 2);
    for term_row in 0..FIELD_PX / 2 {
        let spans: Vec<Span> = (0..FIELD_PX)
            .map(|col| {
                if show_tractor && col == tractor_col && term_row == tractor_row {
                    return Span::styled(
                        game.state.tractor.heading.glyph().to_string(),
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    );
                }
                let top = pixel_color(game, col, term_row * 2);
                let bottom = pixel_color(game, col, term_row * 2 + 1);
                Span::styled("▀", Style::default().fg(top).bg(bottom))
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let title = if game.state.land_cursor.active {
        let p = game.state.land_cursor.plot;
        format!(" Plot ({}, {}) ", p.x, p.y)
    } else {
        " Field ".to_string()
    };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(title),
    );
    f.render_widget(widget, area);

    // One target per plot so tapping the field selects land
    let inner = Rect::new(area.x + 1, area.y + 1, area.width.saturating_sub(2), area.height.saturating_sub(2));
    let grid = game.config.grid_size;
    let mut cs = click_state.borrow_mut();
    for py in 0..grid {
        for pxi in 0..grid {
            let cols = plot_px_span(pxi, game.config.plot_size, px);
            let rows = plot_px_span(py, game.config.plot_size, px);
            if cols.is_empty() || rows.is_empty() {
                continue;
            }
            let row0 = rows.start / 2;
            let row1 = (rows.end + 1) / 2;
            let rect = Rect::new(
                inner.x + cols.start as u16,
                inner.y + row0 as u16,
                cols.len() as u16,
                (row1 - row0) as u16,
            )
            .intersection(inner);
            let id = SELECT_PLOT_BASE + (py * grid + pxi) as u16;
            cs.add_click_target(rect, id);
        }
    }
}

// ── Controls ───────────────────────────────────────────────────

fn render_pad(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let style = if game.state.land_cursor.active {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let mut cs = click_state.borrow_mut();
    TabBar::new("│")
        .tab("[W]↑", style, DRIVE_UP)
        .tab("[A]←", style, DRIVE_LEFT)
        .tab("[S]↓", style, DRIVE_DOWN)
        .tab("[D]→", style, DRIVE_RIGHT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Tractor "),
        )
        .render(f, area, &mut cs);
}

fn render_hooks(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let style = Style::default().fg(Color::Gray);
    let mut cs = click_state.borrow_mut();
    TabBar::new("│")
        .tab("[T]till", style, AUTO_TILL)
        .tab("[F]plant", style, FORCE_PLANT)
        .tab("[G]skip", style, SKIP_STAGE)
        .tab("[R]reset", style, RESET_CYCLE)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Shortcuts "),
        )
        .render(f, area, &mut cs);
}

fn render_speed(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let active = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::Cyan);
    let paused = game.time.is_paused();
    let speed_style = |speed: Speed| {
        if !paused && game.time.speed() == speed {
            active
        } else {
            idle
        }
    };
    let pause_label = if paused { "▶ Play" } else { "❚❚ Pause" };

    let mut bar = TabBar::new(" │ ").tab(
        pause_label,
        if paused { active } else { idle },
        TOGGLE_PAUSE,
    );
    for (speed, id) in Speed::ALL
        .iter()
        .zip([SPEED_NORMAL, SPEED_DOUBLE, SPEED_QUINTUPLE])
    {
        bar = bar.tab(speed.label(), speed_style(*speed), id);
    }

    let mut cs = click_state.borrow_mut();
    bar.block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Speed [Space/1/2/5] "),
    )
    .render(f, area, &mut cs);
}

// ── Status ─────────────────────────────────────────────────────

fn render_status(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let bar_width = (area.width as usize).saturating_sub(24).clamp(6, 20);
    let label = Style::default().fg(Color::DarkGray);

    let mut cl = ClickableList::new();

    let stage = state.stage.as_deref().unwrap_or("None");
    let stage_color = if state.harvestable { WHEAT[0] } else { Color::Green };
    cl.push(Line::from(vec![
        Span::styled(" Stage     ", label),
        Span::styled(stage.to_string(), Style::default().fg(stage_color).add_modifier(Modifier::BOLD)),
    ]));

    let mut growth = vec![Span::styled(" Growth    ", label)];
    growth.extend(progress_bar(state.growth_progress, bar_width, Color::Green));
    cl.push(Line::from(growth));

    let till_target = game.farm.tilling().threshold_pct();
    let till_color = if state.tilling_pct >= till_target { Color::Green } else { GROUND[1] };
    let mut tilled = vec![Span::styled(" Tilled    ", label)];
    tilled.extend(progress_bar(state.tilling_pct, bar_width, till_color));
    cl.push(Line::from(tilled));

    let mut harvested = vec![Span::styled(" Harvested ", label)];
    harvested.extend(progress_bar(state.harvest_pct, bar_width, WHEAT[1]));
    cl.push(Line::from(harvested));

    cl.push(Line::from(vec![
        Span::styled(" Plots     ", label),
        Span::styled(
            format!("{}/{}", state.owned_plots, game.land.total_plots()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  (${} each)", game.config.land_price),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    if state.sell_available {
        cl.push_clickable(
            Line::from(Span::styled(
                format!(" [V] Sell wheat ({} units)", state.pending_yield),
                Style::default().fg(Color::Black).bg(WHEAT[0]).add_modifier(Modifier::BOLD),
            )),
            OPEN_SELL,
        );
    } else {
        cl.push_clickable(
            Line::from(Span::styled(" [V] Sell wheat", Style::default().fg(Color::DarkGray))),
            OPEN_SELL,
        );
    }
    let land_label = if state.land_cursor.active { " [B] Back to tractor" } else { " [B] Buy land" };
    cl.push_clickable(
        Line::from(Span::styled(land_label, Style::default().fg(CURSOR_ADJACENT))),
        TOGGLE_LAND_MODE,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [I] Status report", Style::default().fg(Color::Gray))),
        SHOW_STATUS,
    );

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }

    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Farm "),
    );
    f.render_widget(widget, area);
}

fn render_log(game: &FarmGame, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2);
    let newest = game.state.log.len().saturating_sub(1);

    let log_lines: Vec<Line> = game
        .state
        .log
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let color = if i == newest { Color::White } else { Color::DarkGray };
            Line::from(Span::styled(format!(" {}", entry), Style::default().fg(color)))
        })
        .collect();

    // Long entries wrap, so scroll by rendered lines rather than entries
    let log = Paragraph::new(log_lines).wrap(Wrap { trim: false });
    let total = log.line_count(area.width.saturating_sub(2)) as u16;
    let scroll = total.saturating_sub(visible_height);

    let widget = log.scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Log "),
    );
    f.render_widget(widget, area);
}

// ── Dialogs ────────────────────────────────────────────────────

/// A `width × height` rect centred in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Colour for a forecast by the share of pending units it sells.
pub fn sell_through_color(pct: f64) -> Color {
    if pct >= 80.0 {
        Color::Green
    } else if pct >= 50.0 {
        AMBER
    } else {
        Color::Red
    }
}

fn push_buttons(cl: &mut ClickableList, yes: &str, no: &str) {
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            format!("  [Y] {}", yes),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        DIALOG_CONFIRM,
    );
    cl.push_clickable(
        Line::from(Span::styled(
            format!("  [N] {}", no),
            Style::default().fg(Color::Red),
        )),
        DIALOG_CANCEL,
    );
    cl.push(Line::from(Span::styled(
        "  Enter to confirm, Esc to cancel",
        Style::default().fg(Color::DarkGray),
    )));
}

fn render_dialog(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let text = Style::default().fg(Color::White);
    let mut cl = ClickableList::new();

    let (title, color) = match state.dialog {
        Dialog::None => return,
        Dialog::Planting { percentage } => {
            cl.push(Line::from(Span::styled(
                format!("  You've tilled {:.1}% of your land.", percentage),
                text,
            )));
            cl.push(Line::from(Span::styled("  Plant wheat seeds now?", text)));
            push_buttons(&mut cl, "Plant", "Not yet");
            (" Plant seeds? ", Color::Green)
        }
        Dialog::LandPurchase { plot } => {
            cl.push(Line::from(Span::styled(
                format!("  Buy plot ({}, {})?", plot.x, plot.y),
                text,
            )));
            cl.push(Line::from(Span::styled(
                format!("  Price: ${}", game.land.price_of(plot)),
                Style::default().fg(Color::Yellow),
            )));
            push_buttons(&mut cl, "Buy", "Cancel");
            (" Buy land ", CURSOR_ADJACENT)
        }
        Dialog::PlantingWarning { .. } => {
            cl.push(Line::from(Span::styled(
                "  If you buy this plot, you won't be",
                text,
            )));
            cl.push(Line::from(Span::styled(
                "  able to plant it until your next harvest.",
                text,
            )));
            push_buttons(&mut cl, "Buy anyway", "Keep waiting");
            (" Warning! ", Color::Red)
        }
        Dialog::Sell => {
            let pending = state.pending_yield;
            cl.push(Line::from(Span::styled(
                format!("  Wheat ready: {} units", pending),
                text,
            )));
            cl.push(Line::from(Span::styled(
                format!("  Base price: ${:.2}", game.farm.market().base_price()),
                Style::default().fg(Color::DarkGray),
            )));
            cl.push_clickable(
                Line::from(Span::styled("  [+] Raise price", Style::default().fg(Color::Cyan))),
                PRICE_UP,
            );
            cl.push(Line::from(Span::styled(
                format!("  Your price: ${:.2}", state.price_input),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            cl.push_clickable(
                Line::from(Span::styled("  [-] Lower price", Style::default().fg(Color::Cyan))),
                PRICE_DOWN,
            );
            let forecast = match state.forecast {
                Some((volume, revenue)) => {
                    let pct = game.farm.forecast(state.price_input).sell_through_pct(pending);
                    Span::styled(
                        format!("  Sells {} units ({:.0}%) for ${:.2}", volume, pct, revenue),
                        Style::default().fg(sell_through_color(pct)),
                    )
                }
                None => Span::styled("  No forecast", Style::default().fg(Color::DarkGray)),
            };
            cl.push(Line::from(forecast));
            push_buttons(&mut cl, "Sell", "Cancel");
            (" Sell wheat ", WHEAT[0])
        }
    };

    let height = cl.len() as u16 + 2;
    let popup = centered(area, 48, height);
    f.render_widget(Clear, popup);

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(popup, &mut cs, 1, 1);
    }

    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .title(title),
    );
    f.render_widget(widget, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::config::FarmConfig;

    #[test]
    fn plot_spans_tile_the_field() {
        let px = 36.0 / FIELD_PX as f64;
        assert_eq!(plot_px_span(0, 12.0, px), 0..12);
        assert_eq!(plot_px_span(1, 12.0, px), 12..24);
        assert_eq!(plot_px_span(2, 12.0, px), 24..36);
        assert!(plot_px_span(3, 12.0, px).is_empty());
    }

    #[test]
    fn plot_spans_on_canvas_scale() {
        let config = FarmConfig::preset("canvas-v1").unwrap();
        let px = config.field_size() / FIELD_PX as f64;
        let total: usize = (0..3).map(|p| plot_px_span(p, config.plot_size, px).len()).sum();
        assert_eq!(total, FIELD_PX);
    }

    #[test]
    fn unowned_land_is_grass() {
        let game = FarmGame::new(FarmConfig::default());
        assert_eq!(pixel_color(&game, 0, 0), GRASS);
        assert_eq!(pixel_color(&game, 18, 30), COVER);
    }

    #[test]
    fn tilled_soil_shows_ground() {
        let mut game = FarmGame::new(FarmConfig::default());
        game.handle_input(&crate::input::InputEvent::Key('d'));
        let c = pixel_color(&game, 19, 30);
        assert!(GROUND.contains(&c));
    }

    #[test]
    fn forecast_colours_by_share() {
        assert_eq!(sell_through_color(100.0), Color::Green);
        assert_eq!(sell_through_color(80.0), Color::Green);
        assert_eq!(sell_through_color(65.0), AMBER);
        assert_eq!(sell_through_color(25.0), Color::Red);
    }

    #[test]
    fn centered_popup_fits() {
        let area = Rect::new(0, 0, 40, 20);
        let r = centered(area, 48, 10);
        assert_eq!(r.width, 40);
        assert_eq!(r.y, 5);
    }
}
