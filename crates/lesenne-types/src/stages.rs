use serde::{Deserialize, Serialize};

/// Named phases of a single request, surfaced for progress display.
///
/// This is the one canonical enumeration; display layers consume it rather
/// than keeping their own stage-to-label mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Idle,
    QuestionProcessing,
    DocumentRetrieval,
    ContextGeneration,
    ResponseGeneration,
    MemorySaving,
    Completed,
}

/// The five user-visible stages in execution order, excluding the terminal
/// `Completed` marker.
pub const STAGE_SEQUENCE: [ProcessingStage; 5] = [
    ProcessingStage::QuestionProcessing,
    ProcessingStage::DocumentRetrieval,
    ProcessingStage::ContextGeneration,
    ProcessingStage::ResponseGeneration,
    ProcessingStage::MemorySaving,
];

impl ProcessingStage {
    /// Human label shown next to the progress card
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "En attente",
            Self::QuestionProcessing => "Analyse de votre question",
            Self::DocumentRetrieval => "Recherche dans la base de connaissances",
            Self::ContextGeneration => "Préparation du contexte",
            Self::ResponseGeneration => "Génération de la réponse",
            Self::MemorySaving => "Sauvegarde de la conversation",
            Self::Completed => "Terminé",
        }
    }

    /// Position in [`STAGE_SEQUENCE`], if this is a user-visible stage
    pub fn index(&self) -> Option<usize> {
        STAGE_SEQUENCE.iter().position(|s| s == self)
    }
}

/// A stage-transition notification emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: ProcessingStage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Fraction of the request already completed, in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
}

impl StageEvent {
    pub fn new(stage: ProcessingStage) -> Self {
        let progress = match stage {
            ProcessingStage::Completed => Some(1.0),
            _ => stage
                .index()
                .map(|i| i as f32 / STAGE_SEQUENCE.len() as f32),
        };

        Self {
            stage,
            message: Some(stage.label().to_string()),
            progress,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
