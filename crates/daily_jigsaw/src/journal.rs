use std::env;
use std::path::PathBuf;

use bevy::asset::io::file::FileAssetReader;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use bevy_turborand::prelude::*;
use jigsaw_core::journal::{Generator, Journal};
use jigsaw_core::{CalendarDay, PuzzleError};

const JOURNAL_FILE: &str = "daily_jigsaw.json";
const JOURNAL_ENV: &str = "DAILY_JIGSAW_JOURNAL";
const ASSETS_DIR: &str = "assets";
const FALLBACK_PUZZLE: &str = "puzzles/fallback.png";
const MAX_TITLE_CHARS: usize = 48;

const HABITS: [&str; 5] = [
    "Drink a glass of water",
    "Take a ten minute walk",
    "Stretch for five minutes",
    "Read a few pages",
    "Tidy your desk",
];

const TASK_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// The session history and where it is saved.
#[derive(Resource)]
pub struct JournalState {
    pub journal: Journal,
    pub path: PathBuf,
}

/// A task title being typed in. `None` while the keyboard drives the board.
#[derive(Resource, Default, Debug)]
pub struct TaskDraft(pub Option<String>);

#[derive(Debug, PartialEq, Eq)]
enum DraftStep {
    Editing,
    Commit(String),
    Cancel,
}

impl TaskDraft {
    pub const fn is_open(&self) -> bool {
        self.0.is_some()
    }

    fn apply(&mut self, key: &Key) -> DraftStep {
        let Some(text) = self.0.as_mut() else {
            return DraftStep::Cancel;
        };
        match key {
            Key::Enter => self.0.take().map_or(DraftStep::Cancel, DraftStep::Commit),
            Key::Escape => {
                self.0 = None;
                DraftStep::Cancel
            }
            Key::Backspace => {
                text.pop();
                DraftStep::Editing
            }
            Key::Space => {
                push_limited(text, " ");
                DraftStep::Editing
            }
            Key::Character(typed) => {
                push_limited(text, typed);
                DraftStep::Editing
            }
            _ => DraftStep::Editing,
        }
    }
}

fn push_limited(text: &mut String, typed: &str) {
    for character in typed.chars().filter(|character| !character.is_control()) {
        if text.chars().count() >= MAX_TITLE_CHARS {
            return;
        }
        text.push(character);
    }
}

pub fn drafting(draft: Res<TaskDraft>) -> bool {
    draft.is_open()
}

/// Serves bundled artwork instead of calling a remote image service.
#[derive(Resource, Default)]
pub struct OfflineGenerator;

impl Generator for OfflineGenerator {
    fn generate_image(&mut self, prompt: &str) -> Result<String, PuzzleError> {
        let theme = prompt
            .strip_prefix("Cute ")
            .and_then(|rest| rest.split_once(" character"))
            .map(|(theme, _)| theme)
            .ok_or_else(|| PuzzleError::Generator(format!("no artwork for {prompt:?}")))?;
        let slug = theme.to_lowercase().replace(' ', "_");
        let image = format!("puzzles/{slug}.png");
        if !FileAssetReader::get_base_path()
            .join(ASSETS_DIR)
            .join(&image)
            .is_file()
        {
            return Err(PuzzleError::Generator(format!("{image} is not bundled")));
        }
        Ok(image)
    }

    fn suggest_tasks(&mut self) -> Result<Vec<String>, PuzzleError> {
        Ok(HABITS.iter().map(|habit| (*habit).to_owned()).collect())
    }

    fn fallback_image(&self) -> String {
        FALLBACK_PUZZLE.to_owned()
    }
}

pub struct JournalPlugin;

impl Plugin for JournalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OfflineGenerator>()
            .init_resource::<TaskDraft>()
            .add_systems(Startup, load_journal)
            .add_systems(
                Update,
                (
                    edit_task_draft,
                    handle_journal_keys.run_if(not(drafting)),
                    save_journal.run_if(resource_changed::<JournalState>),
                )
                    .chain(),
            );
    }
}

pub fn journal_path() -> PathBuf {
    env::var_os(JOURNAL_ENV).map_or_else(|| PathBuf::from(JOURNAL_FILE), PathBuf::from)
}

pub fn load_journal(
    mut commands: Commands,
    mut rng: ResMut<GlobalRng>,
    mut generator: ResMut<OfflineGenerator>,
) {
    let path = journal_path();
    let mut journal = Journal::load(&path).unwrap_or_else(|err| {
        error!("Could not load {path:?}, starting a new journal: {err}");
        Journal::default()
    });
    info!("Loaded {} sessions from {path:?}", journal.sessions().len());

    journal.ensure_day(CalendarDay::today(), &mut *rng, &mut *generator);
    commands.insert_resource(JournalState { journal, path });
}

fn save_journal(state: Res<JournalState>) {
    if state.journal.sessions().is_empty() {
        return;
    }
    if let Err(err) = state.journal.save(&state.path) {
        warn!("Journal not saved: {err}");
    }
}

fn edit_task_draft(
    mut keyboard_input: EventReader<KeyboardInput>,
    mut keys: ResMut<ButtonInput<KeyCode>>,
    mut draft: ResMut<TaskDraft>,
    mut state: ResMut<JournalState>,
) {
    if !draft.is_open() {
        keyboard_input.clear();
        return;
    }
    for event in keyboard_input.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match draft.apply(&event.logical_key) {
            DraftStep::Editing => {}
            DraftStep::Commit(title) => {
                if !state.journal.add_task(&title) {
                    info!("Task not added");
                }
                // The board would otherwise read the same Enter as an archive.
                keys.clear_just_pressed(KeyCode::Enter);
                break;
            }
            DraftStep::Cancel => break,
        }
    }
}

fn handle_journal_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut draft: ResMut<TaskDraft>,
    mut state: ResMut<JournalState>,
    mut rng: ResMut<GlobalRng>,
    mut generator: ResMut<OfflineGenerator>,
) {
    let deleting = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    for (index, key) in TASK_KEYS.iter().enumerate() {
        if !keys.just_pressed(*key) {
            continue;
        }
        let Some(task_id) = state
            .journal
            .active()
            .and_then(|session| session.tasks.get(index))
            .map(|task| task.id.clone())
        else {
            continue;
        };
        let changed = if deleting {
            state.journal.delete_task(&task_id)
        } else {
            state.journal.toggle_task(&task_id)
        };
        if !changed {
            info!("Task {} is read-only", index + 1);
        }
    }

    if keys.just_pressed(KeyCode::Tab) {
        draft.0 = Some(String::new());
    }
    if keys.just_pressed(KeyCode::KeyT) {
        let added = state.journal.suggest_tasks(&mut *generator);
        info!("Added {added} suggested tasks");
    }
    if keys.just_pressed(KeyCode::KeyN) {
        state
            .journal
            .create_next_day(CalendarDay::today(), &mut *rng, &mut *generator);
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        state.journal.select_relative(-1);
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        state.journal.select_relative(1);
    }
    if keys.just_pressed(KeyCode::KeyR)
        && !state.journal.regenerate_image(&mut *rng, &mut *generator)
    {
        info!("Image kept");
    }
}
