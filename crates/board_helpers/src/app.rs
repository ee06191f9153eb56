use bevy::asset::{AssetMetaCheck, AssetPlugin};
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{PowerPreference, RenderCreation, WgpuSettings, WgpuSettingsPriority};
use bevy::window::{PresentMode, WindowMode, WindowResolution};

// typical smartphone screen ratio (9:16)
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Dark circuit-board green behind everything.
pub const BACKGROUND: Color = Color::srgb(0.102, 0.114, 0.086);

// Creates a Bevy app with the window, asset and render settings shared by
// every board front end.
pub fn get_default_app(title: &str) -> App {
    let mut app = App::new();

    let asset_plugin = AssetPlugin {
        file_path: "assets".to_string(),
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: title.to_string(),
            present_mode: PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            mode: WindowMode::Windowed,
            ..default()
        }),
        ..default()
    };

    let render_plugin = RenderPlugin {
        render_creation: RenderCreation::Automatic(WgpuSettings {
            power_preference: PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..default()
        }),
        ..default()
    };

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin)
            .set(window_plugin)
            .set(render_plugin),
    );

    // This plugin is useful to preserve battery life on mobile.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    app.insert_resource(ClearColor(BACKGROUND));

    app
}
