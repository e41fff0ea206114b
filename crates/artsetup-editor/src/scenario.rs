//! Scenario (background room) selection.

use crate::persistence::{ImageGenerator, ImageUpload, PersistenceError, ScenarioStore};
use artsetup_core::{ModelError, Scenario, ScenarioId, ScenarioPrompt};

/// The scenarios available to the editor and the one drawn behind the
/// canvas.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBoard {
    scenarios: Vec<Scenario>,
    active: Option<ScenarioId>,
}

impl ScenarioBoard {
    /// The first scenario, if any, starts active.
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        let active = scenarios.first().map(|s| s.id);
        Self { scenarios, active }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn active(&self) -> Option<&Scenario> {
        let id = self.active?;
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Append and make active.
    pub fn add(&mut self, scenario: Scenario) {
        self.active = Some(scenario.id);
        self.scenarios.push(scenario);
    }

    pub fn select(&mut self, id: ScenarioId) -> Result<(), ModelError> {
        if !self.scenarios.iter().any(|s| s.id == id) {
            return Err(ModelError::UnknownRecord(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Drop a scenario. When it was active, the first remaining one
    /// becomes active (or none).
    pub fn remove(&mut self, id: ScenarioId) -> Option<Scenario> {
        let idx = self.scenarios.iter().position(|s| s.id == id)?;
        let removed = self.scenarios.remove(idx);
        if self.active == Some(id) {
            self.active = self.scenarios.first().map(|s| s.id);
        }
        Some(removed)
    }

    /// Upload a room photo and make it active.
    pub async fn upload<S: ScenarioStore>(&mut self, store: &S, upload: ImageUpload) -> Result<&Scenario, PersistenceError> {
        let scenario = store.create(upload).await?;
        self.add(scenario);
        Ok(self.last())
    }

    /// Generate a room from a short description, store it, and make it
    /// active.
    pub async fn generate<G: ImageGenerator, S: ScenarioStore>(
        &mut self,
        generator: &G,
        store: &S,
        subject: &str,
    ) -> Result<&Scenario, PersistenceError> {
        let prompt = ScenarioPrompt::new(subject)?;
        log::info!("generating scenario for `{}`", prompt.subject());
        let bytes = generator.generate(&prompt).await?;
        let file_name = format!("{}.png", prompt.subject().replace(char::is_whitespace, "-"));
        self.upload(store, ImageUpload::new(file_name, "image/png", bytes)).await
    }

    /// Delete from the store first; the board only changes on success.
    pub async fn delete<S: ScenarioStore>(&mut self, store: &S, id: ScenarioId) -> Result<(), PersistenceError> {
        store.delete(id).await?;
        self.remove(id);
        Ok(())
    }

    fn last(&self) -> &Scenario {
        &self.scenarios[self.scenarios.len() - 1]
    }
}
