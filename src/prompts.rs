//! Classification tasks: prompts and structured-output schemas.
//!
//! Configuration data for the two news-labeling tasks. The system prompts
//! and schema field descriptions are Spanish because the labeled corpus is
//! Spanish-language news.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// System prompt for headline clickbait classification.
pub const CLICKBAIT_PROMPT: &str = r#"Eres un experto analista de medios especializado en detectar desinformación. Tu tarea es clasificar titulares de noticias.

DEFINICIÓN DE CLICKBAIT:
"Contenido que utiliza titulares sensacionalistas, exagerados o engañosos diseñados exclusivamente para despertar curiosidad y provocar un clic, priorizando visitas rápidas sobre la calidad."

CRITERIOS DE CLASIFICACIÓN (SI/NO):
El input es solo el título. Debes marcar `is_clickbait: True` si detectas alguno de estos patrones:

1. **Ocultación de información (Curiosity Gap):** El título plantea una pregunta o escenario pero obliga a entrar para saber el sujeto o el resultado (ej. "...y no creerás lo que pasó", "El motivo por el que...").
2. **Sensacionalismo/Hipérbole:** Uso de adjetivos extremos que no parecen objetivos (ej. "Brutal", "Increíble", "Destrozó").
3. **Apelación directa:** Uso de imperativos o segunda persona (ej. "Tienes que ver...", "Lo que estás haciendo mal").

Si el titular es informativo, resume la noticia y permite entender el contexto sin necesidad de hacer clic obligatoriamente, marca `is_clickbait: False`.

Analiza el titular y devuelve el JSON requerido."#;

/// System prompt for full-article sensationalism classification.
pub const SENSATIONALISM_PROMPT: &str = r#"Eres un experto analista de medios y desinformación. Tu tarea es analizar una noticia (Titular + Cuerpo) para determinar si es sensacionalista.

DEFINICIÓN DE SENSACIONALISMO:
"Estilo editorial que busca provocar una reacción emocional inmediata e intensa (miedo, sorpresa, indignación, morbo) en lugar de ofrecer información neutral. Prioriza el impacto sobre la precisión, usando exageración, dramatización o manipulación de hechos."

INPUT:
Recibirás el texto de la noticia con el formato:
TITULAR: [Texto]
CUERPO: [Texto]

CRITERIOS DE CLASIFICACIÓN (SI/NO):
Marca `is_sensationalist: True` si detectas patrones claros de manipulación emocional o falta de rigor, tales como:

1. **Lenguaje Emotivo/Cargado:** Uso excesivo de adjetivos o adverbios que juzgan los hechos en lugar de describirlos (ej. "Horroroso", "Vergonzoso", "Milagroso").
2. **Dramatización/Catastrofismo:** Presentar hechos menores como crisis existenciales o narrativas de "héroes y villanos" sin matices.
3. **Discrepancia Título-Cuerpo:** El titular promete algo impactante que el cuerpo de la noticia no sustenta o desmiente (exageración no justificada).
4. **Enfoque en el Morbo/Conflicto:** Se centra en detalles escabrosos, dolorosos o polémicos irrelevantes para la comprensión del hecho noticioso.

Si el artículo mantiene un tono neutro, descriptivo y los hechos presentados justifican el tono del titular, marca `is_sensationalist: False`.

Analiza el texto completo y devuelve el JSON requerido."#;

/// Structured output for the clickbait task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClickbaitAnalysis {
    #[schemars(
        description = "Explicación concisa (máx 20 palabras) citando el rasgo lingüístico detectado (ej. 'Usa brecha de curiosidad', 'Adjetivos exagerados')."
    )]
    pub clickbait_reasoning: String,

    #[schemars(
        description = "True si el titular es clickbait (sensacionalista/engañoso), False si es informativo."
    )]
    pub is_clickbait: bool,
}

/// Structured output for the sensationalism task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SensationalismAnalysis {
    #[schemars(
        description = "Explicación concisa (máx 30 palabras) identificando qué elemento detonó la clasificación (ej. 'Discrepancia grave entre título y hechos', 'Uso excesivo de adjetivos alarmistas', 'Tono neutro y factual')."
    )]
    pub sensationalist_reasoning: String,

    #[schemars(
        description = "True si el artículo es sensacionalista (manipula emociones/exagera), False si es periodismo neutral/riguroso."
    )]
    pub is_sensationalist: bool,
}

/// One of the supported labeling tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LabelTask {
    /// Headline-only clickbait classification.
    Clickbait,
    /// Full-article sensationalism classification.
    Sensationalism,
}

impl LabelTask {
    /// System prompt sent with every request of this task.
    pub fn prompt(&self) -> &'static str {
        match self {
            LabelTask::Clickbait => CLICKBAIT_PROMPT,
            LabelTask::Sensationalism => SENSATIONALISM_PROMPT,
        }
    }

    /// Schema name announced to the provider.
    pub fn schema_name(&self) -> &'static str {
        match self {
            LabelTask::Clickbait => "clickbait_analysis_schema",
            LabelTask::Sensationalism => "sensationalism_analysis_schema",
        }
    }

    /// JSON schema of the task's analysis struct.
    pub fn analysis_schema(&self) -> serde_json::Value {
        let root = match self {
            LabelTask::Clickbait => schema_for!(ClickbaitAnalysis),
            LabelTask::Sensationalism => schema_for!(SensationalismAnalysis),
        };
        serde_json::to_value(root.schema).expect("schema serialization cannot fail")
    }

    /// Full `response_format` descriptor requesting strict structured
    /// output for this task.
    pub fn response_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.schema_name(),
                "schema": self.analysis_schema(),
                "strict": true,
            },
        })
    }
}
