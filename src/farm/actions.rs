//! Semantic action IDs for farm click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Tractor pad ─────────────────────────────────────────────────
pub const DRIVE_UP: u16 = 0;
pub const DRIVE_LEFT: u16 = 1;
pub const DRIVE_DOWN: u16 = 2;
pub const DRIVE_RIGHT: u16 = 3;

// ── Time controls ───────────────────────────────────────────────
pub const TOGGLE_PAUSE: u16 = 10;
pub const SPEED_NORMAL: u16 = 11;
pub const SPEED_DOUBLE: u16 = 12;
pub const SPEED_QUINTUPLE: u16 = 13;

// ── Panels ──────────────────────────────────────────────────────
pub const TOGGLE_LAND_MODE: u16 = 20;
pub const OPEN_SELL: u16 = 21;
pub const SHOW_STATUS: u16 = 22;

// ── Dialog buttons ──────────────────────────────────────────────
pub const DIALOG_CONFIRM: u16 = 30;
pub const DIALOG_CANCEL: u16 = 31;
pub const PRICE_UP: u16 = 32;
pub const PRICE_DOWN: u16 = 33;

// ── Testing hooks ───────────────────────────────────────────────
pub const AUTO_TILL: u16 = 40;
pub const SKIP_STAGE: u16 = 41;
pub const RESET_CYCLE: u16 = 42;
pub const FORCE_PLANT: u16 = 43;

// ── Field plots (base + y * grid_size + x) ──────────────────────
pub const SELECT_PLOT_BASE: u16 = 100;
