//! Farm commands: input mapping and execution.
//!
//! Keys and clicks both become a [`Command`]; [`execute`] applies it to the
//! game. Dialogs are modal, so while one is open only its own buttons and the
//! time controls get through.

use log::{info, warn};

use crate::clock::Speed;
use crate::input::{KEY_ENTER, KEY_ESC};

use super::actions::*;
use super::error::LandError;
use super::land::{LandRegistry, PlotCoord};
use super::state::{Dialog, FarmState, Heading};
use super::FarmGame;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Drive(Heading),
    MoveLandCursor(Heading),
    ToggleLandMode,
    SelectPlot(PlotCoord),
    Confirm,
    Cancel,
    OpenSell,
    PriceUp,
    PriceDown,
    TogglePause,
    SetSpeed(Speed),
    AutoTill,
    ForcePlant,
    SkipStage,
    ResetCycle,
    ShowStatus,
}

fn heading_for(key: char) -> Option<Heading> {
    match key {
        'w' => Some(Heading::Up),
        'a' => Some(Heading::Left),
        's' => Some(Heading::Down),
        'd' => Some(Heading::Right),
        _ => None,
    }
}

fn time_command(key: char) -> Option<Command> {
    match key {
        ' ' | 'p' => Some(Command::TogglePause),
        '1' => Some(Command::SetSpeed(Speed::Normal)),
        '2' => Some(Command::SetSpeed(Speed::Double)),
        '5' => Some(Command::SetSpeed(Speed::Quintuple)),
        _ => None,
    }
}

/// Map a normalized key to a command for the current screen mode.
pub fn command_for_key(key: char, state: &FarmState) -> Option<Command> {
    if let Some(cmd) = time_command(key) {
        return Some(cmd);
    }

    if state.dialog != Dialog::None {
        return match key {
            KEY_ENTER | 'y' => Some(Command::Confirm),
            KEY_ESC | 'n' => Some(Command::Cancel),
            '+' | '=' if state.dialog == Dialog::Sell => Some(Command::PriceUp),
            '-' if state.dialog == Dialog::Sell => Some(Command::PriceDown),
            _ => None,
        };
    }

    if state.land_cursor.active {
        if let Some(h) = heading_for(key) {
            return Some(Command::MoveLandCursor(h));
        }
        return match key {
            KEY_ENTER => Some(Command::Confirm),
            'b' | KEY_ESC => Some(Command::ToggleLandMode),
            _ => None,
        };
    }

    if let Some(h) = heading_for(key) {
        return Some(Command::Drive(h));
    }
    match key {
        'b' => Some(Command::ToggleLandMode),
        'v' => Some(Command::OpenSell),
        't' => Some(Command::AutoTill),
        'f' => Some(Command::ForcePlant),
        'g' => Some(Command::SkipStage),
        'r' => Some(Command::ResetCycle),
        'i' => Some(Command::ShowStatus),
        _ => None,
    }
}

/// Map a click action ID to a command.
pub fn command_for_click(action_id: u16, grid_size: i32) -> Option<Command> {
    let cmd = match action_id {
        DRIVE_UP => Command::Drive(Heading::Up),
        DRIVE_LEFT => Command::Drive(Heading::Left),
        DRIVE_DOWN => Command::Drive(Heading::Down),
        DRIVE_RIGHT => Command::Drive(Heading::Right),
        TOGGLE_PAUSE => Command::TogglePause,
        SPEED_NORMAL => Command::SetSpeed(Speed::Normal),
        SPEED_DOUBLE => Command::SetSpeed(Speed::Double),
        SPEED_QUINTUPLE => Command::SetSpeed(Speed::Quintuple),
        TOGGLE_LAND_MODE => Command::ToggleLandMode,
        OPEN_SELL => Command::OpenSell,
        SHOW_STATUS => Command::ShowStatus,
        DIALOG_CONFIRM => Command::Confirm,
        DIALOG_CANCEL => Command::Cancel,
        PRICE_UP => Command::PriceUp,
        PRICE_DOWN => Command::PriceDown,
        AUTO_TILL => Command::AutoTill,
        SKIP_STAGE => Command::SkipStage,
        RESET_CYCLE => Command::ResetCycle,
        FORCE_PLANT => Command::ForcePlant,
        id if id >= SELECT_PLOT_BASE && grid_size > 0 => {
            let idx = (id - SELECT_PLOT_BASE) as i32;
            if idx >= grid_size * grid_size {
                return None;
            }
            Command::SelectPlot(PlotCoord::new(idx % grid_size, idx / grid_size))
        }
        _ => return None,
    };
    Some(cmd)
}

/// Apply a command. Returns `false` when it had nothing to act on.
pub fn execute(game: &mut FarmGame, cmd: Command) -> bool {
    let modal = game.state.dialog != Dialog::None;
    match cmd {
        Command::TogglePause => {
            game.time.toggle_pause();
            let msg = if game.time.is_paused() { "Paused." } else { "Resumed." };
            game.state.add_log(msg);
            true
        }
        Command::SetSpeed(speed) => {
            game.time.set_speed(speed);
            game.state.add_log(&format!("Speed {}", speed.label()));
            true
        }
        Command::Confirm => confirm(game),
        Command::Cancel => cancel(game),
        Command::PriceUp | Command::PriceDown => {
            if game.state.dialog != Dialog::Sell {
                return false;
            }
            let step = if cmd == Command::PriceUp {
                game.config.price_step
            } else {
                -game.config.price_step
            };
            game.state
                .adjust_price(step, game.config.min_price, game.config.max_price);
            game.farm.preview_sale(game.state.price_input);
            true
        }
        _ if modal => false,
        Command::Drive(heading) => drive(game, heading),
        Command::MoveLandCursor(heading) => move_land_cursor(game, heading),
        Command::ToggleLandMode => {
            let cursor = &mut game.state.land_cursor;
            cursor.active = !cursor.active;
            let msg = if cursor.active {
                "Land mode: pick a plot next to your land, Enter to buy."
            } else {
                "Back to the tractor."
            };
            game.state.add_log(msg);
            true
        }
        Command::SelectPlot(plot) => {
            game.state.land_cursor.active = true;
            if game.land.is_reachable(plot) {
                game.state.land_cursor.plot = plot;
            }
            request_purchase(game, plot)
        }
        Command::OpenSell => {
            if !game.farm.market().is_ready_to_sell() {
                game.state.add_log("Nothing to sell yet. Harvest more wheat first.");
                return false;
            }
            game.state.price_input = game
                .farm
                .market()
                .base_price()
                .clamp(game.config.min_price, game.config.max_price);
            game.state.dialog = Dialog::Sell;
            game.farm.preview_sale(game.state.price_input);
            true
        }
        Command::AutoTill => match game.farm.auto_till(&game.land) {
            Ok(stats) => {
                game.state
                    .add_log(&format!("Auto-tilled: {:.1}% of owned land.", stats.percentage));
                true
            }
            Err(e) => {
                warn!("auto-till rejected: {}", e);
                game.state.add_log(&format!("Can't auto-till: {}", e));
                false
            }
        },
        Command::ForcePlant => match game.farm.force_plant() {
            Ok(_) => true,
            Err(e) => {
                warn!("force plant rejected: {}", e);
                game.state.add_log(&format!("Can't plant: {}", e));
                false
            }
        },
        Command::SkipStage => match game.farm.force_advance() {
            Ok(change) => {
                info!("stage skipped to {}", change.name);
                true
            }
            Err(e) => {
                warn!("skip stage rejected: {}", e);
                game.state.add_log(&format!("Can't skip: {}", e));
                false
            }
        },
        Command::ResetCycle => {
            game.farm.reset();
            game.state.price_input = game.config.base_price;
            game.state.add_log("Field reset. Start tilling again.");
            true
        }
        Command::ShowStatus => {
            let line = status_line(game);
            info!("{}", line);
            game.state.add_log(&line);
            true
        }
    }
}

fn drive(game: &mut FarmGame, heading: Heading) -> bool {
    if game.state.land_cursor.active {
        return false;
    }
    game.state
        .move_tractor(heading, game.config.tractor_step, game.config.field_size());
    let (x, y) = (game.state.tractor.x, game.state.tractor.y);
    game.farm.drive_over(&game.land, x, y);
    true
}

fn move_land_cursor(game: &mut FarmGame, heading: Heading) -> bool {
    let (dx, dy) = heading.delta();
    let current = game.state.land_cursor.plot;
    let target = PlotCoord::new(current.x + dx as i32, current.y + dy as i32);
    if game.land.in_bounds(target) && game.land.is_reachable(target) {
        game.state.land_cursor.plot = target;
        true
    } else {
        game.state.flash_blocked();
        false
    }
}

fn request_purchase(game: &mut FarmGame, plot: PlotCoord) -> bool {
    match game.land.check_purchase(plot) {
        Ok(()) => {
            game.state.dialog = Dialog::LandPurchase { plot };
            true
        }
        Err(LandError::AlreadyOwned { .. }) => {
            game.state.add_log("You already own this plot.");
            false
        }
        Err(e) => {
            game.state.flash_blocked();
            game.state.add_log(&format!("Can't buy that plot: {}", e));
            false
        }
    }
}

fn execute_purchase(game: &mut FarmGame, plot: PlotCoord) -> bool {
    game.state.dialog = Dialog::None;
    match game.land.purchase(plot) {
        Ok(()) => {
            let msg = format!(
                "Bought plot ({}, {}). You own {}/{} plots.",
                plot.x,
                plot.y,
                game.land.owned_plot_count(),
                game.land.total_plots()
            );
            game.state.add_log(&msg);
            true
        }
        Err(e) => {
            warn!("purchase failed: {}", e);
            game.state.add_log(&format!("Purchase failed: {}", e));
            false
        }
    }
}

fn confirm(game: &mut FarmGame) -> bool {
    match game.state.dialog {
        Dialog::Planting { .. } => {
            game.state.dialog = Dialog::None;
            match game.farm.confirm_planting() {
                Ok(_) => {
                    game.state.add_log("Seeds planted. Growth started.");
                    true
                }
                Err(e) => {
                    warn!("planting rejected: {}", e);
                    false
                }
            }
        }
        Dialog::LandPurchase { plot } => {
            if game.farm.growth().is_planted() {
                game.state.dialog = Dialog::PlantingWarning { plot };
                true
            } else {
                execute_purchase(game, plot)
            }
        }
        Dialog::PlantingWarning { plot } => execute_purchase(game, plot),
        Dialog::Sell => match game.farm.confirm_sale(game.state.price_input) {
            Ok(_) => true,
            Err(e) => {
                warn!("sale rejected: {}", e);
                game.state.dialog = Dialog::None;
                false
            }
        },
        Dialog::None if game.state.land_cursor.active => {
            let plot = game.state.land_cursor.plot;
            request_purchase(game, plot)
        }
        Dialog::None => false,
    }
}

fn cancel(game: &mut FarmGame) -> bool {
    match game.state.dialog {
        Dialog::Planting { .. } => {
            game.state.dialog = Dialog::None;
            game.farm.cancel_planting();
            game.state.add_log("Planting postponed. Keep tilling to be asked again.");
            true
        }
        Dialog::LandPurchase { .. } | Dialog::PlantingWarning { .. } => {
            game.state.dialog = Dialog::None;
            true
        }
        Dialog::Sell => {
            game.state.dialog = Dialog::None;
            game.state.forecast = None;
            true
        }
        Dialog::None if game.state.land_cursor.active => {
            game.state.land_cursor.active = false;
            true
        }
        Dialog::None => false,
    }
}

/// One-line summary of both trackers and the crop.
pub fn status_line(game: &FarmGame) -> String {
    let tilling = game.farm.tilling_stats(&game.land);
    let harvest = game.farm.harvest_stats(&game.land);
    let growth = game.farm.growth();
    let stage = growth.stage_name().unwrap_or("None");
    format!(
        "Tilled {:.1}% (need {}%), stage {} {:.0}%, harvested {:.1}% ({} samples), day clock {:.0}s",
        tilling.percentage,
        game.farm.tilling().threshold_pct(),
        stage,
        growth.progress_percentage(),
        harvest.percentage,
        game.farm.harvest().samples().len(),
        game.farm.sim_secs()
    )
}
