use core::fmt::{self, Write as _};

use bevy::prelude::*;
use jigsaw_core::PuzzleBoard;
use jigsaw_core::journal::DailySession;

use crate::journal::{JournalState, TaskDraft};

const PANEL_TEXT: Color = Color::srgb(0.886, 0.91, 0.941);
const STATUS_TEXT: Color = Color::srgb(0.29, 0.871, 0.502);

#[derive(Component)]
struct HeaderText;

#[derive(Component)]
struct TaskPanelText;

#[derive(Component)]
struct StatusText;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud).add_systems(
            Update,
            refresh_hud.run_if(
                resource_exists::<PuzzleBoard>.and(
                    resource_changed::<JournalState>
                        .or(resource_changed::<PuzzleBoard>)
                        .or(resource_changed::<TaskDraft>),
                ),
            ),
        );
    }
}

fn text_node(top: Val, font_size: f32, color: Color) -> impl Bundle {
    (
        Text::default(),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
        TextLayout::new_with_justify(JustifyText::Left),
        Node {
            position_type: PositionType::Absolute,
            top,
            left: Val::Percent(4.0),
            width: Val::Percent(92.0),
            ..default()
        },
    )
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((text_node(Val::Percent(1.5), 14.0, PANEL_TEXT), HeaderText));
    commands.spawn((text_node(Val::Percent(58.0), 16.0, PANEL_TEXT), TaskPanelText));
    commands.spawn((text_node(Val::Percent(90.0), 14.0, STATUS_TEXT), StatusText));
}

fn header_line(session: &DailySession, version: &str) -> String {
    let theme = if session.is_revealed() {
        session.theme.as_str()
    } else {
        "ENCRYPTED LOG"
    };
    format!(
        "SYS v{version}  {}  {theme}  GRID_MTX {}",
        session.date, session.grid_size
    )
}

fn task_lines(session: &DailySession, draft: Option<&str>) -> String {
    let mut lines = String::new();
    for (index, task) in session.tasks.iter().enumerate() {
        let mark = if task.completed { 'x' } else { ' ' };
        let _: fmt::Result = writeln!(lines, "{}. [{mark}] {}", index + 1, task.title);
    }
    if let Some(draft) = draft {
        let _: fmt::Result = writeln!(lines, "+ {draft}_");
    } else if session.tasks.is_empty() {
        lines.push_str("No tasks. Press T for suggestions or Tab to write one.\n");
    }
    let _: fmt::Result = write!(lines, "{}% done", session.tasks.progress_percent());
    lines
}

fn status_line(board: &PuzzleBoard) -> String {
    if board.read_only() {
        "ARCHIVED RECORD".to_owned()
    } else if board.is_complete() {
        "SYSTEM RESTORED  [Enter] upload to archive".to_owned()
    } else if board.can_auto_assemble() {
        "[A] AUTO_ALIGN()".to_owned()
    } else {
        format!(
            "{}/{} revealed  {} locked",
            board.unlocked_count(),
            board.total_pieces(),
            board.locked_count()
        )
    }
}

fn refresh_hud(
    state: Res<JournalState>,
    board: Res<PuzzleBoard>,
    draft: Res<TaskDraft>,
    mut header: Query<&mut Text, (With<HeaderText>, Without<TaskPanelText>, Without<StatusText>)>,
    mut tasks: Query<&mut Text, (With<TaskPanelText>, Without<StatusText>)>,
    mut status: Query<&mut Text, (With<StatusText>, Without<HeaderText>)>,
) {
    let Some(session) = state.journal.active() else {
        return;
    };
    for mut text in &mut header {
        **text = header_line(session, &state.journal.system_version());
    }
    for mut text in &mut tasks {
        **text = task_lines(session, draft.0.as_deref());
    }
    for mut text in &mut status {
        **text = status_line(&board);
    }
}
