//! Interface de linha de comando do sketchrender baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, gallery)
//! e flags globais (--verbose). Os value-enums mapeiam para os tipos
//! internos de provedor e resolução.

use clap::{Parser, Subcommand, ValueEnum};

use crate::providers::{Provider, ResolutionTier};

/// sketchrender — gera renders fotorrealistas a partir de esboços via APIs de geração de imagem.
#[derive(Debug, Parser)]
#[command(name = "sketchrender", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Provedor de geração aceito pela CLI, mapeado para [`Provider`] internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// nano-banana-pro (imagem para imagem).
    NanoBanana,
    /// flux-2/flex-image-to-image (imagem para imagem).
    Flux,
    /// seedream/4.5-text-to-image (somente texto).
    Seedream,
    /// z-image (somente texto, prompt limitado a 1000 caracteres).
    ZImage,
}

impl From<EngineArg> for Provider {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::NanoBanana => Provider::NanoBananaPro,
            EngineArg::Flux => Provider::Flux2Flex,
            EngineArg::Seedream => Provider::Seedream45,
            EngineArg::ZImage => Provider::ZImage,
        }
    }
}

/// Nível de resolução aceito pela CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResolutionArg {
    #[value(name = "1k")]
    OneK,
    #[value(name = "2k")]
    TwoK,
    #[value(name = "4k")]
    FourK,
}

impl From<ResolutionArg> for ResolutionTier {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::OneK => ResolutionTier::OneK,
            ResolutionArg::TwoK => ResolutionTier::TwoK,
            ResolutionArg::FourK => ResolutionTier::FourK,
        }
    }
}

/// Proporção de tela aceita pelos provedores.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AspectArg {
    #[value(name = "16:9")]
    Wide,
    #[value(name = "1:1")]
    Square,
    #[value(name = "9:16")]
    Tall,
    #[value(name = "4:3")]
    Classic,
    #[value(name = "3:4")]
    Portrait,
}

impl AspectArg {
    /// Tag no vocabulário compartilhado dos provedores.
    pub fn as_tag(&self) -> &'static str {
        match self {
            AspectArg::Wide => "16:9",
            AspectArg::Square => "1:1",
            AspectArg::Tall => "9:16",
            AspectArg::Classic => "4:3",
            AspectArg::Portrait => "3:4",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submete os esboços aos provedores selecionados e acompanha os resultados.
    Run {
        /// Arquivos de esboço (jpg/png), em ordem.
        #[arg(required = true)]
        images: Vec<String>,

        /// Prompt descrevendo o render desejado.
        #[arg(long, conflicts_with = "prompt_file")]
        prompt: Option<String>,

        /// Caminho para um arquivo de texto contendo o prompt.
        #[arg(long)]
        prompt_file: Option<String>,

        /// Influência do prompt sobre o esboço, entre 0.0 e 1.0.
        #[arg(long, default_value_t = 0.55)]
        strength: f64,

        /// Resolução alvo (provedores sem suporte reduzem silenciosamente).
        #[arg(long, value_enum, default_value = "1k")]
        resolution: ResolutionArg,

        /// Proporção de tela.
        #[arg(long, value_enum, default_value = "16:9")]
        aspect_ratio: AspectArg,

        /// Provedores a usar (repita a flag para vários).
        #[arg(long = "engine", value_enum, required = true)]
        engines: Vec<EngineArg>,
    },

    /// Lista os renders mais recentes salvos na galeria.
    Gallery {
        /// Número máximo de entradas.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}
