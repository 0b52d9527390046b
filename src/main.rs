mod clock;
mod farm;
mod input;
mod logging;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use farm::config::FarmConfig;
use farm::FarmGame;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use log::{info, warn};
use ratzilla::event::{MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

/// Value of `key` in a `?a=1&b=2` query string.
fn query_param(search: &str, key: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

fn location_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Millisecond timestamp for the frame clock.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Query the grid container's bounding rect and convert a pixel position to
/// a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let col = pixel_x_to_col(click_x, rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows)?;
    log::trace!("click at ({}, {}) -> cell ({}, {})", mouse_x, mouse_y, col, row);
    Some((col, row))
}

/// URL-encoded JSON table from `?config=`.
#[cfg(target_arch = "wasm32")]
fn decode_component(raw: &str) -> Option<String> {
    js_sys::decode_uri_component(raw).ok().map(String::from)
}

#[cfg(not(target_arch = "wasm32"))]
fn decode_component(raw: &str) -> Option<String> {
    Some(raw.to_string())
}

/// Tuning table from `?config=` (JSON) or `?preset=`, falling back to the
/// default table.
fn load_config(search: &str) -> FarmConfig {
    if let Some(raw) = query_param(search, "config") {
        match decode_component(&raw).map(|json| FarmConfig::from_json(&json)) {
            Some(Ok(config)) => {
                info!("using config from URL");
                return config;
            }
            Some(Err(e)) => warn!("{}; ignoring config", e),
            None => warn!("config parameter is not valid URL encoding"),
        }
    }
    let Some(name) = query_param(search, "preset") else {
        return FarmConfig::default();
    };
    match FarmConfig::preset(&name) {
        Ok(config) => {
            info!("using preset {}", name);
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            FarmConfig::default()
        }
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let search = location_search();
    logging::init(logging::parse_level(query_param(&search, "log").as_deref()));

    let game = Rc::new(RefCell::new(FarmGame::new(load_config(&search))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let action = cs.hit_test(col, row);
            drop(cs);

            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(event) = input::key_event(&key_event.code) {
                game.borrow_mut().handle_input(&event);
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let mut gs = game.borrow_mut();
            gs.frame(now_ms());
            let size = f.area();

            // Update terminal dimensions and clear click targets
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            gs.render(f, size, &click_state);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_values() {
        assert_eq!(query_param("?preset=canvas-v1&log=debug", "log").as_deref(), Some("debug"));
        assert_eq!(query_param("?preset=canvas-v1", "preset").as_deref(), Some("canvas-v1"));
        assert_eq!(query_param("preset=x", "preset").as_deref(), Some("x"));
    }

    #[test]
    fn query_param_missing() {
        assert_eq!(query_param("", "log"), None);
        assert_eq!(query_param("?logx=1", "log"), None);
        assert_eq!(query_param("?log", "log").as_deref(), Some(""));
    }

    #[test]
    fn bad_preset_falls_back() {
        let config = load_config("?preset=moon");
        assert_eq!(config, FarmConfig::default());
        let config = load_config("?preset=canvas-v2");
        assert_eq!(config.stages.len(), 4);
    }

    #[test]
    fn json_config_wins_over_preset() {
        let config = load_config(r#"?preset=canvas-v2&config={"yield_per_plot":50}"#);
        assert_eq!(config.yield_per_plot, 50);
        assert_eq!(config.stages.len(), 5);

        let config = load_config(r#"?config={"stages":[]}&preset=canvas-v2"#);
        assert_eq!(config.stages.len(), 4);
    }
}
