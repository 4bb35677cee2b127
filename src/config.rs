//! Configuração do sketchrender carregada a partir de `sketchrender.toml`.
//!
//! A struct [`SketchrenderConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `KIEAI_API_KEY` tem precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Configuração de nível superior carregada de `sketchrender.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SketchrenderConfig {
    /// Chave da API Kie.ai.
    #[serde(default)]
    pub api_key: String,

    /// Endpoint da ponte de planilha usado como galeria persistente.
    /// Quando ausente, resultados não são salvos (a rodada segue normalmente).
    #[serde(default)]
    pub gallery_url: Option<String>,

    /// Intervalo entre ciclos de polling, em milissegundos.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Teto de espera para rodadas só de imagem, em segundos.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Teto de espera quando a rodada inclui jobs de vídeo, em segundos.
    #[serde(default = "default_video_timeout_secs")]
    pub video_timeout_secs: u64,

    /// URL base da API de jobs (sobrescrita apenas em testes).
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// URL base do endpoint de upload (sobrescrita apenas em testes).
    #[serde(default)]
    pub upload_base_url: Option<String>,

    /// URL base do relay de notificações (sobrescrita apenas em testes).
    #[serde(default)]
    pub relay_base_url: Option<String>,
}

// Valor padrão para o intervalo de polling: 2000ms.
fn default_poll_interval_ms() -> u64 {
    2000
}

// Valor padrão para o teto de rodadas de imagem: 300s.
fn default_image_timeout_secs() -> u64 {
    300
}

// Valor padrão para o teto de rodadas com vídeo: 600s.
fn default_video_timeout_secs() -> u64 {
    600
}

impl Default for SketchrenderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            gallery_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            image_timeout_secs: default_image_timeout_secs(),
            video_timeout_secs: default_video_timeout_secs(),
            api_base_url: None,
            upload_base_url: None,
            relay_base_url: None,
        }
    }
}

impl SketchrenderConfig {
    /// Carrega a configuração de `sketchrender.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("sketchrender.toml"))
    }

    /// Carrega de um caminho explícito, com a mesma precedência de ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<SketchrenderConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para a chave API.
        if let Ok(key) = std::env::var("KIEAI_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }

        Ok(config)
    }
}
