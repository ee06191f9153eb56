use bevy::prelude::*;
use bevy_turborand::prelude::*;

mod board;
mod hud;
mod journal;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
enum BoardPhase {
    #[default]
    Init,
    Playing,
    Sealed,
}

pub fn run() {
    board_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .init_state::<BoardPhase>()
        .insert_resource(GlobalRng::new())
        .add_plugins((journal::JournalPlugin, board::BoardPlugin, hud::HudPlugin))
        .run();
}
