//! Diagram and model services
//!
//! Thin use-case layers. [`DiagramService`] sits over a [`DiagramRepository`]
//! and the interchange [`Orchestrator`]; [`ModelService`] over a
//! [`ModelRepository`]. Neither owns state beyond its collaborators.

use tracing::{debug, info, span, warn, Level};

use crate::core::{
    Diagram, DiagramError, DiagramRepository, Model, ModelRepository, Notation, ValidationReport,
};
use crate::plugins::orchestrator::Orchestrator;

pub struct DiagramService<R: DiagramRepository> {
    repository: R,
    orchestrator: Orchestrator,
}

impl<R: DiagramRepository> DiagramService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_orchestrator(repository, Orchestrator::with_default_detectors())
    }

    pub fn with_orchestrator(repository: R, orchestrator: Orchestrator) -> Self {
        Self {
            repository,
            orchestrator,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Create, store and return an empty diagram
    pub fn create_diagram(
        &mut self,
        notation: Notation,
        name: Option<&str>,
    ) -> Result<Diagram, DiagramError> {
        let mut diagram = Diagram::create_new(notation);
        if let Some(name) = name {
            diagram.rename(name);
        }
        self.repository.save(&diagram)?;
        info!(diagram_id = %diagram.id, %notation, "Created diagram");
        Ok(diagram)
    }

    /// Store a diagram
    ///
    /// Validation problems are logged, not returned; an invalid diagram is
    /// still stored.
    pub fn save_diagram(&mut self, diagram: &mut Diagram) -> Result<(), DiagramError> {
        let save_span = span!(Level::INFO, "save_diagram", diagram_id = %diagram.id);
        let _enter = save_span.enter();

        diagram.touch();
        let report = diagram.validate();
        for error in &report.errors {
            warn!(error = %error, "Saving invalid diagram");
        }
        for warning in &report.warnings {
            debug!(warning = %warning, "Validation warning");
        }
        self.repository.save(diagram)
    }

    pub fn load_diagram(&self, id: &str) -> Result<Option<Diagram>, DiagramError> {
        self.repository.find_by_id(id)
    }

    /// Like [`load_diagram`](Self::load_diagram), but a missing diagram is an error
    pub fn require_diagram(&self, id: &str) -> Result<Diagram, DiagramError> {
        self.load_diagram(id)?.ok_or_else(|| {
            DiagramError::invalid_argument(format!("Diagram with ID {} not found", id))
        })
    }

    pub fn delete_diagram(&mut self, id: &str) -> Result<bool, DiagramError> {
        let removed = self.repository.delete(id)?;
        if removed {
            info!(diagram_id = id, "Deleted diagram");
        }
        Ok(removed)
    }

    pub fn list_diagrams(&self) -> Result<Vec<Diagram>, DiagramError> {
        self.repository.find_all()
    }

    pub fn validate_diagram(&self, id: &str) -> Result<ValidationReport, DiagramError> {
        Ok(self.require_diagram(id)?.validate())
    }

    /// draw.io XML of a stored diagram
    pub fn export_to_drawio(&self, id: &str) -> anyhow::Result<String> {
        let diagram = self.require_diagram(id)?;
        self.orchestrator.export(&diagram)
    }

    /// Decode a draw.io document and store the result
    pub fn import_from_drawio(&mut self, xml: &str) -> anyhow::Result<Diagram> {
        let mut diagram = self.orchestrator.import(xml)?;
        self.save_diagram(&mut diagram)?;
        Ok(diagram)
    }
}

pub struct ModelService<R: ModelRepository> {
    repository: R,
}

impl<R: ModelRepository> ModelService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Create, store and return an empty model
    pub fn create_model(&mut self, name: Option<&str>) -> Result<Model, DiagramError> {
        let model = Model::create_new(name);
        self.repository.save_model(&model)?;
        info!(model_id = %model.id, "Created model");
        Ok(model)
    }

    /// Touch and store a model
    pub fn save_model(&mut self, model: &mut Model) -> Result<(), DiagramError> {
        model.touch();
        debug!(model_id = %model.id, diagrams = model.diagrams().len(), "Saving model");
        self.repository.save_model(model)
    }

    pub fn load_model(&self, id: &str) -> Result<Option<Model>, DiagramError> {
        self.repository.find_model(id)
    }

    pub fn delete_model(&mut self, id: &str) -> Result<bool, DiagramError> {
        let removed = self.repository.delete_model(id)?;
        if removed {
            info!(model_id = id, "Deleted model");
        }
        Ok(removed)
    }

    pub fn list_models(&self) -> Result<Vec<Model>, DiagramError> {
        self.repository.find_all_models()
    }
}
