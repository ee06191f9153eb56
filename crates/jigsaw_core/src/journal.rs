//! History of daily sessions and the boundary to the image/task generator.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, VariantArray};
use tracing::{info, warn};
use uuid::Uuid;

use crate::tasks::TaskList;
use crate::{BoardConfig, CalendarDay, GridSize, PuzzleError, RandomSource};

/// Shown when the generator cannot produce an image.
pub const FALLBACK_IMAGE: &str = "https://picsum.photos/800/800?grayscale";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, VariantArray)]
pub enum Theme {
    #[strum(to_string = "Shiba Inu Dog")]
    ShibaInuDog,
    #[strum(to_string = "Tabby Cat")]
    TabbyCat,
    #[strum(to_string = "Baby Penguin")]
    BabyPenguin,
    #[strum(to_string = "Red Panda")]
    RedPanda,
    #[strum(to_string = "Fennec Fox")]
    FennecFox,
    #[strum(to_string = "Tiny Owl")]
    TinyOwl,
    #[strum(to_string = "Bunny Rabbit")]
    BunnyRabbit,
    #[strum(to_string = "Golden Hamster")]
    GoldenHamster,
    Hedgehog,
    #[strum(to_string = "Koala Bear")]
    KoalaBear,
    #[strum(to_string = "Pink Axolotl")]
    PinkAxolotl,
    Capybara,
    #[strum(to_string = "River Otter")]
    RiverOtter,
    Raccoon,
    #[strum(to_string = "Baby Elephant")]
    BabyElephant,
    #[strum(to_string = "Deer Fawn")]
    DeerFawn,
}

impl Theme {
    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self::VARIANTS
            .get(rng.below(Self::VARIANTS.len()))
            .copied()
            .unwrap_or(Self::ShibaInuDog)
    }

    pub fn prompt(self) -> String {
        format!(
            "Cute {self} character, isometric 3d voxel art style, digital pet aesthetic, \
             colorful, clean dark gradient background, 8-bit inspired, high fidelity render"
        )
    }
}

/// Produces puzzle images and task ideas, typically backed by a remote
/// service. Failures are absorbed by the journal.
pub trait Generator {
    fn generate_image(&mut self, prompt: &str) -> Result<String, PuzzleError>;

    fn suggest_tasks(&mut self) -> Result<Vec<String>, PuzzleError>;

    fn fallback_image(&self) -> String {
        FALLBACK_IMAGE.to_owned()
    }
}

/// One day of the tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySession {
    pub id: String,
    #[serde(rename = "dateStr")]
    pub date: CalendarDay,
    #[serde(rename = "imageUrl")]
    pub image_ref: String,
    pub theme: String,
    pub tasks: TaskList,
    pub is_sealed: bool,
    #[serde(default)]
    pub grid_size: GridSize,
}

impl DailySession {
    /// Sealed, or every task done.
    pub fn is_revealed(&self) -> bool {
        self.is_sealed || self.tasks.all_completed()
    }

    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            grid: self.grid_size,
            image: self.image_ref.clone(),
        }
    }
}

/// Every session, newest first, plus which one is on the board.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    sessions: Vec<DailySession>,
    active: Option<String>,
}

impl Journal {
    pub fn from_json(json: &str) -> Result<Self, PuzzleError> {
        Ok(Self {
            sessions: serde_json::from_str(json)?,
            active: None,
        })
    }

    pub fn to_json(&self) -> Result<String, PuzzleError> {
        Ok(serde_json::to_string_pretty(&self.sessions)?)
    }

    /// Reads a saved journal. A missing file is an empty journal.
    pub fn load(path: &Path) -> Result<Self, PuzzleError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|source| PuzzleError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), PuzzleError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| PuzzleError::Io {
            path: path.to_owned(),
            source,
        })
    }

    pub fn sessions(&self) -> &[DailySession] {
        &self.sessions
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&DailySession> {
        let id = self.active.as_deref()?;
        self.sessions.iter().find(|session| session.id == id)
    }

    fn active_mut(&mut self) -> Option<&mut DailySession> {
        let id = self.active.as_deref()?;
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    fn editable_mut(&mut self) -> Option<&mut DailySession> {
        self.active_mut().filter(|session| !session.is_sealed)
    }

    /// Activates the session for `day`, creating it when missing. Returns
    /// whether a session was created.
    pub fn ensure_day(
        &mut self,
        day: CalendarDay,
        rng: &mut impl RandomSource,
        generator: &mut impl Generator,
    ) -> bool {
        if let Some(existing) = self.sessions.iter().find(|session| session.date == day) {
            self.active = Some(existing.id.clone());
            return false;
        }
        self.create_session(day, rng, generator);
        true
    }

    /// Creates the day after the latest stored one, or `today` when empty.
    pub fn create_next_day(
        &mut self,
        today: CalendarDay,
        rng: &mut impl RandomSource,
        generator: &mut impl Generator,
    ) -> String {
        let day = self
            .sessions
            .iter()
            .map(|session| session.date)
            .max()
            .map_or(today, CalendarDay::next);
        self.create_session(day, rng, generator)
    }

    /// Prepends a fresh session for `day` and activates it.
    pub fn create_session(
        &mut self,
        day: CalendarDay,
        rng: &mut impl RandomSource,
        generator: &mut impl Generator,
    ) -> String {
        let theme = Theme::random(rng);
        let grid_size = GridSize::random(rng);
        let image_ref = generator
            .generate_image(&theme.prompt())
            .unwrap_or_else(|err| {
                warn!("Image generation failed, using fallback: {err}");
                generator.fallback_image()
            });

        let session = DailySession {
            id: Uuid::new_v4().to_string(),
            date: day,
            image_ref,
            theme: theme.to_string(),
            tasks: TaskList::starter(),
            is_sealed: false,
            grid_size,
        };
        info!("Created session for {day}: {theme}, {grid_size}");
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.active = Some(id.clone());
        id
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.sessions.iter().any(|session| session.id == id) {
            return false;
        }
        self.active = Some(id.to_owned());
        true
    }

    /// Activates the session `offset` places away from the active one,
    /// wrapping around.
    pub fn select_relative(&mut self, offset: isize) -> bool {
        let len = self.sessions.len();
        if len == 0 {
            return false;
        }
        let current = self
            .active
            .as_deref()
            .and_then(|id| self.sessions.iter().position(|session| session.id == id))
            .unwrap_or(0);
        let next = (current as isize + offset).rem_euclid(len as isize) as usize;
        let Some(id) = self.sessions.get(next).map(|session| session.id.clone()) else {
            return false;
        };
        self.active = Some(id);
        true
    }

    pub fn add_task(&mut self, title: &str) -> bool {
        self.editable_mut()
            .is_some_and(|session| session.tasks.add(title).is_some())
    }

    pub fn toggle_task(&mut self, id: &str) -> bool {
        self.editable_mut()
            .is_some_and(|session| session.tasks.toggle(id))
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        self.editable_mut()
            .is_some_and(|session| session.tasks.remove(id))
    }

    /// Appends the generator's suggestions to the active session. Returns how
    /// many tasks were added.
    pub fn suggest_tasks(&mut self, generator: &mut impl Generator) -> usize {
        let Some(session) = self.editable_mut() else {
            return 0;
        };
        match generator.suggest_tasks() {
            Ok(titles) => titles
                .iter()
                .filter(|title| session.tasks.add(title).is_some())
                .count(),
            Err(err) => {
                warn!("Task suggestions failed: {err}");
                0
            }
        }
    }

    /// Records the archival of the active session.
    pub fn seal_active(&mut self) -> bool {
        let Some(session) = self.editable_mut() else {
            return false;
        };
        session.is_sealed = true;
        info!("Sealed session {}", session.date);
        true
    }

    /// Picks a new theme and image for the active, unsealed session.
    pub fn regenerate_image(
        &mut self,
        rng: &mut impl RandomSource,
        generator: &mut impl Generator,
    ) -> bool {
        if self.editable_mut().is_none() {
            return false;
        }
        let theme = Theme::random(rng);
        let image_ref = match generator.generate_image(&theme.prompt()) {
            Ok(image_ref) => image_ref,
            Err(err) => {
                warn!("Image regeneration failed: {err}");
                return false;
            }
        };
        let Some(session) = self.editable_mut() else {
            return false;
        };
        session.image_ref = image_ref;
        session.theme = theme.to_string();
        true
    }

    /// Completed tasks across every session.
    pub fn total_completed(&self) -> usize {
        self.sessions
            .iter()
            .map(|session| session.tasks.completed_count())
            .sum()
    }

    /// Starts at 1.00 and gains 0.01 per completed task.
    pub fn system_version(&self) -> String {
        format!("{:.2}", 1. + self.total_completed() as f64 * 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::Sequence;

    #[derive(Default)]
    struct Scripted {
        fail: bool,
        prompts: Vec<String>,
    }

    impl Generator for Scripted {
        fn generate_image(&mut self, prompt: &str) -> Result<String, PuzzleError> {
            self.prompts.push(prompt.to_owned());
            if self.fail {
                return Err(PuzzleError::Generator("offline".to_owned()));
            }
            Ok(format!("image-{}", self.prompts.len()))
        }

        fn suggest_tasks(&mut self) -> Result<Vec<String>, PuzzleError> {
            if self.fail {
                return Err(PuzzleError::Generator("offline".to_owned()));
            }
            Ok(vec!["Stretch".to_owned(), " ".to_owned(), "Read".to_owned()])
        }
    }

    fn day(text: &str) -> CalendarDay {
        text.parse().expect("valid day")
    }

    #[test]
    fn ensure_day_reuses_existing_session() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.0, 0.99]);
        let mut generator = Scripted::default();
        assert!(journal.ensure_day(day("2025-06-01"), &mut rng, &mut generator), "created");
        let session = journal.active().cloned().expect("active session");
        assert_eq!(session.theme, "Shiba Inu Dog", "first theme");
        assert_eq!(session.grid_size.get(), 5, "largest grid");
        assert_eq!(session.image_ref, "image-1", "generated image");
        assert!(generator.prompts.first().is_some_and(|prompt| prompt.starts_with("Cute Shiba Inu Dog")), "prompt");

        assert!(!journal.ensure_day(day("2025-06-01"), &mut rng, &mut generator), "reused");
        assert_eq!(journal.sessions().len(), 1, "single session");
    }

    #[test]
    fn next_day_follows_the_latest_date() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.5]);
        let mut generator = Scripted {
            fail: true,
            ..Scripted::default()
        };
        journal.create_next_day(day("2025-06-01"), &mut rng, &mut generator);
        journal.create_next_day(day("2025-06-01"), &mut rng, &mut generator);
        let dates: Vec<_> = journal.sessions().iter().map(|session| session.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-06-02", "2025-06-01"], "newest first");
        assert_eq!(journal.active().map(|session| session.image_ref.as_str()), Some(FALLBACK_IMAGE), "fallback image");
    }

    #[test]
    fn sealed_sessions_refuse_edits() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.1]);
        let mut generator = Scripted::default();
        journal.create_session(day("2025-06-01"), &mut rng, &mut generator);
        assert!(journal.toggle_task("1"), "toggle before sealing");
        assert!(journal.seal_active(), "sealed");
        assert!(!journal.seal_active(), "sealed once");
        assert!(!journal.toggle_task("2"), "frozen tasks");
        assert!(!journal.add_task("More"), "no additions");
        assert!(!journal.delete_task("1"), "no deletions");
        assert!(!journal.regenerate_image(&mut rng, &mut generator), "image kept");
        assert!(journal.active().is_some_and(DailySession::is_revealed), "revealed once sealed");
    }

    #[test]
    fn suggestions_skip_blank_titles() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.1]);
        let mut generator = Scripted::default();
        journal.create_session(day("2025-06-01"), &mut rng, &mut generator);
        assert_eq!(journal.suggest_tasks(&mut generator), 2, "two usable titles");
        generator.fail = true;
        assert_eq!(journal.suggest_tasks(&mut generator), 0, "failure adds nothing");
        assert_eq!(journal.active().map(|session| session.tasks.len()), Some(5), "3 starters + 2");
    }

    #[test]
    fn version_counts_completed_tasks_everywhere() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.1]);
        let mut generator = Scripted::default();
        journal.create_session(day("2025-06-01"), &mut rng, &mut generator);
        journal.toggle_task("1");
        journal.create_session(day("2025-06-02"), &mut rng, &mut generator);
        journal.toggle_task("1");
        journal.toggle_task("2");
        assert_eq!(journal.total_completed(), 3, "across sessions");
        assert_eq!(journal.system_version(), "1.03", "two decimals");
    }

    #[test]
    fn stored_sessions_default_their_grid() {
        let json = r#"[{
            "id": "a",
            "dateStr": "2025-05-31",
            "imageUrl": "img",
            "theme": "Capybara",
            "tasks": [{ "id": "1", "title": "Walk", "completed": true }],
            "isSealed": false
        }]"#;
        let mut journal = Journal::from_json(json).expect("valid journal");
        assert_eq!(journal.sessions().first().map(|session| session.grid_size.get()), Some(3), "default grid");
        assert!(journal.active().is_none(), "nothing active after loading");
        assert!(journal.select("a"), "selectable");
        assert!(journal.active().is_some_and(DailySession::is_revealed), "all tasks done");
        assert!(Journal::from_json("{").is_err(), "malformed");
    }

    #[test]
    fn select_relative_wraps() {
        let mut journal = Journal::default();
        let mut rng = Sequence::new(&[0.1]);
        let mut generator = Scripted::default();
        let older = journal.create_session(day("2025-06-01"), &mut rng, &mut generator);
        let newer = journal.create_session(day("2025-06-02"), &mut rng, &mut generator);
        assert!(journal.select_relative(1), "moves");
        assert_eq!(journal.active_id(), Some(older.as_str()), "older session");
        assert!(journal.select_relative(1), "wraps");
        assert_eq!(journal.active_id(), Some(newer.as_str()), "back to newest");
    }
}
