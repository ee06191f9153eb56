use std::fs;

use bevy::prelude::*;
use bevy_turborand::prelude::*;
use board_helpers::input::{
    held_screen_position, just_pressed_screen_position, just_released, world_to_screen,
};
use jigsaw_core::geometry::background_sample_origin;
use jigsaw_core::{BoardConfig, BoardEvent, BoardRules, GridSize, PuzzleBoard};

use crate::BoardPhase;
use crate::journal::{JournalState, drafting, load_journal};

/// Side of the board in world units.
pub const BOARD_SIDE: f32 = 320.;
const FRAME_SIDE: f32 = 336.;
/// Board centre, nudged up to leave room for the task panel.
const BOARD_CENTER: Vec2 = Vec2::new(0., 96.);
const RULES_FILE: &str = "board_rules.json";

const FRAME_COLOR: Color = Color::srgb(0.557, 0.588, 0.518);
const SOCKET_COLOR: Color = Color::srgb(0.165, 0.188, 0.141);
const SLOT_COLOR: Color = Color::srgb(0.247, 0.29, 0.212);

#[derive(Component)]
struct MainCamera;

#[derive(Component)]
pub struct PieceSprite {
    id: usize,
}

#[derive(Component)]
struct SlotGuide;

/// The whole picture, shown once the board is complete.
#[derive(Component)]
struct FullImage;

/// Image and grid the current piece entities were spawned for.
#[derive(Resource, Default)]
struct SpawnedBoard(Option<(String, GridSize)>);

#[derive(Resource)]
struct BoardImage(Handle<Image>);

/// A committed board transition, re-sent for the rest of the app.
#[derive(Event, Debug)]
pub struct BoardChanged(pub BoardEvent);

pub struct BoardPlugin;

impl Plugin for BoardPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BoardChanged>()
            .init_resource::<SpawnedBoard>()
            .add_systems(Startup, init_board.after(load_journal))
            .add_systems(
                Update,
                (
                    sync_board_with_journal.run_if(resource_changed::<JournalState>),
                    drag_pieces.run_if(in_state(BoardPhase::Playing)),
                    handle_board_keys
                        .run_if(in_state(BoardPhase::Playing).and(not(drafting))),
                    forward_board_events,
                    seal_archived_session,
                    respawn_pieces.run_if(resource_changed::<PuzzleBoard>),
                    update_piece_sprites,
                )
                    .chain(),
            );
    }
}

fn load_rules() -> BoardRules {
    let path = crate::journal::journal_path().with_file_name(RULES_FILE);
    let Ok(json) = fs::read_to_string(&path) else {
        return BoardRules::default();
    };
    BoardRules::from_json(&json).unwrap_or_else(|err| {
        warn!("Ignoring {path:?}: {err}");
        BoardRules::default()
    })
}

fn init_board(
    mut commands: Commands,
    state: Res<JournalState>,
    mut next_state: ResMut<NextState<BoardPhase>>,
) {
    // Camera
    commands.spawn(Camera2d).insert(MainCamera);
    // Frame
    commands
        .spawn((
            Sprite::from_color(FRAME_COLOR, Vec2::splat(FRAME_SIDE)),
            Transform::from_translation(BOARD_CENTER.extend(-10.)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(SOCKET_COLOR, Vec2::splat(BOARD_SIDE)),
                Transform::from_xyz(0., 0., 5.),
            ));
        });

    let config = state.journal.active().map_or_else(
        || BoardConfig {
            grid: GridSize::default(),
            image: String::new(),
        },
        |session| session.board_config(),
    );
    commands.insert_resource(PuzzleBoard::new(config, load_rules()));
    next_state.set(BoardPhase::Playing);
}

fn sync_board_with_journal(
    state: Res<JournalState>,
    mut board: ResMut<PuzzleBoard>,
    mut rng: ResMut<GlobalRng>,
    mut loaded_session: Local<Option<String>>,
    mut next_state: ResMut<NextState<BoardPhase>>,
) {
    let Some(session) = state.journal.active() else {
        return;
    };

    if loaded_session.as_deref() != Some(session.id.as_str()) {
        info!("Loading session {} ({})", session.date, session.theme);
        *loaded_session = Some(session.id.clone());
        board.load(session.board_config());
    } else if board.config().image != session.image_ref {
        board.reconfigure(session.board_config());
    }

    board.set_read_only(session.is_sealed);
    board.set_all_tasks_completed(session.tasks.all_completed());
    board.apply_progress(session.tasks.completed_count(), &mut *rng);

    next_state.set(if session.is_sealed {
        BoardPhase::Sealed
    } else {
        BoardPhase::Playing
    });
}

/// Window-space rectangle covered by the board.
fn board_screen_rect(camera: &Query<(&Camera, &GlobalTransform)>) -> Option<Rect> {
    let half = BOARD_SIDE / 2.;
    let top_left = world_to_screen(camera, BOARD_CENTER + Vec2::new(-half, half))?;
    let bottom_right = world_to_screen(camera, BOARD_CENTER + Vec2::new(half, -half))?;
    Some(Rect::from_corners(top_left, bottom_right))
}

fn drag_pieces(
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut board: ResMut<PuzzleBoard>,
) {
    let Some(rect) = board_screen_rect(&camera) else {
        return;
    };

    if let Some(pointer) = just_pressed_screen_position(&mouse_button_input, &touch_input, &windows)
    {
        let point = (pointer - rect.min) / rect.size() * 100.;
        if board.pieces().iter().any(|piece| piece.is_movable()) {
            board.begin_drag_at(point, pointer);
        }
    }

    if board.active_drag().is_none() {
        return;
    }
    if let Some(pointer) = held_screen_position(&mouse_button_input, &touch_input, &windows) {
        board.drag_to(pointer, rect);
    }
    if just_released(&mouse_button_input, &touch_input) {
        board.end_drag();
    }
}

fn handle_board_keys(keys: Res<ButtonInput<KeyCode>>, mut board: ResMut<PuzzleBoard>) {
    if keys.just_pressed(KeyCode::KeyA) && !board.auto_assemble() {
        info!("Auto-assembly needs every piece revealed and every task done");
    }
    if keys.just_pressed(KeyCode::Enter) && !board.archive() {
        info!("Finish the board before archiving it");
    }
}

fn forward_board_events(
    mut board: ResMut<PuzzleBoard>,
    mut board_changed: EventWriter<BoardChanged>,
) {
    if !board.has_pending_events() {
        return;
    }
    for event in board.drain_events() {
        debug!("Board event: {event:?}");
        board_changed.send(BoardChanged(event));
    }
}

fn seal_archived_session(
    mut board_changed: EventReader<BoardChanged>,
    mut state: ResMut<JournalState>,
) {
    for BoardChanged(event) in board_changed.read() {
        if *event == BoardEvent::Archived && !state.journal.seal_active() {
            warn!("Archived a board without an editable session");
        }
    }
}

/// Centre of a piece in world space, from its top-left corner in board
/// percentages.
fn percent_to_world(top_left: Vec2, extent: f32) -> Vec2 {
    let centre = (top_left + Vec2::splat(extent / 2.)) / 100. * BOARD_SIDE;
    BOARD_CENTER + Vec2::new(centre.x - BOARD_SIDE / 2., BOARD_SIDE / 2. - centre.y)
}

fn respawn_pieces(
    mut commands: Commands,
    board: Res<PuzzleBoard>,
    asset_server: Res<AssetServer>,
    mut spawned: ResMut<SpawnedBoard>,
    existing: Query<Entity, Or<(With<PieceSprite>, With<SlotGuide>, With<FullImage>)>>,
) {
    let key = (board.config().image.clone(), board.grid());
    if spawned.0.as_ref() == Some(&key) {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn_recursive();
    }

    let image: Handle<Image> = asset_server.load(key.0.clone());
    let grid = board.grid();
    let piece_side = BOARD_SIDE / grid.get() as f32;
    for piece in board.pieces() {
        let slot = percent_to_world(piece.target(grid), grid.piece_extent());
        commands.spawn((
            Sprite::from_color(SLOT_COLOR, Vec2::splat(piece_side - 2.)),
            Transform::from_translation(slot.extend(0.)),
            SlotGuide,
        ));
        commands.spawn((
            Sprite {
                image: image.clone(),
                custom_size: Some(Vec2::splat(piece_side)),
                ..default()
            },
            Transform::default(),
            Visibility::Hidden,
            PieceSprite { id: piece.id },
        ));
    }
    commands.spawn((
        Sprite {
            image: image.clone(),
            custom_size: Some(Vec2::splat(BOARD_SIDE)),
            ..default()
        },
        Transform::from_translation(BOARD_CENTER.extend(1.)),
        Visibility::Hidden,
        FullImage,
    ));
    commands.insert_resource(BoardImage(image));
    info!("Spawned {} pieces for {}", board.total_pieces(), key.0);
    spawned.0 = Some(key);
}

fn update_piece_sprites(
    board: Res<PuzzleBoard>,
    board_image: Option<Res<BoardImage>>,
    images: Res<Assets<Image>>,
    mut pieces: Query<(&PieceSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
    mut overlays: Query<
        (&mut Visibility, Has<FullImage>),
        (Without<PieceSprite>, Or<(With<SlotGuide>, With<FullImage>)>),
    >,
) {
    let Some(board_image) = board_image else {
        return;
    };
    let grid = board.grid();
    let extent = grid.piece_extent();
    let complete = board.is_complete();
    let image_size = images.get(&board_image.0).map(Image::size_f32);

    for (piece_sprite, mut sprite, mut transform, mut visibility) in &mut pieces {
        let Some(piece) = board.pieces().get(piece_sprite.id) else {
            continue;
        };
        *visibility = if piece.is_unlocked && !complete {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        let centre = percent_to_world(piece.position, extent);
        transform.translation = centre.extend(2. + piece.z_index as f32 * 0.01);

        if let Some(size) = image_size {
            let tile = size / grid.get() as f32;
            let origin = background_sample_origin(grid.get(), piece.correct_row, piece.correct_col);
            let min = origin / 100. * (size - tile);
            sprite.rect = Some(Rect::from_corners(min, min + tile));
        }
    }

    for (mut visibility, is_full_image) in &mut overlays {
        let show = if is_full_image { complete } else { !complete };
        visibility.set_if_neq(if show {
            Visibility::Visible
        } else {
            Visibility::Hidden
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_corners_map_to_world() {
        let half = BOARD_SIDE / 2.;
        let top_left = percent_to_world(Vec2::ZERO, 0.);
        assert_eq!(top_left, BOARD_CENTER + Vec2::new(-half, half), "top-left corner");
        let centre = percent_to_world(Vec2::splat(25.), 50.);
        assert_eq!(centre, BOARD_CENTER, "centred piece");
    }
}
