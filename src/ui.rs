//! Interface de terminal do sketchrender — barras de progresso e cores.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`RunProgress`] desenha uma linha por job, em
//! ordem de despacho, rederivada inteiramente do estado atual do registro
//! a cada ciclo de polling — não guarda histórico próprio.

use std::collections::HashMap;

use console::Style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::gallery::GalleryEntry;
use crate::reconciler::RunOutcome;
use crate::registry::{JobState, Registry};

/// Indicador visual do progresso de uma rodada de geração.
///
/// Jobs pendentes aparecem com spinner; sucessos em verde com a URL do
/// resultado; falhas em vermelho com o motivo informado pelo provedor.
pub struct RunProgress {
    multi: MultiProgress,
    // Uma barra por job_id, criada na ordem de despacho.
    bars: HashMap<String, ProgressBar>,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Cria uma linha de progresso por job registrado e começa a animação.
    pub fn start(registry: &Registry) -> Self {
        Self::with_target(registry, ProgressDrawTarget::stderr())
    }

    /// Versão sem saída de terminal, usada no modo silencioso.
    pub fn hidden(registry: &Registry) -> Self {
        Self::with_target(registry, ProgressDrawTarget::hidden())
    }

    fn with_target(registry: &Registry, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("invalid template");

        let mut bars = HashMap::new();
        for job in registry.jobs() {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style.clone());
            pb.set_message(format!("{}: waiting for result...", job.provider_label));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            bars.insert(job.job_id.clone(), pb);
        }

        Self {
            multi,
            bars,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Redesenha todas as linhas a partir do estado atual do registro.
    pub fn render(&self, registry: &Registry) {
        for job in registry.jobs() {
            let Some(pb) = self.bars.get(&job.job_id) else {
                continue;
            };
            if pb.is_finished() {
                continue;
            }
            match &job.state {
                JobState::Pending => {
                    pb.set_message(format!("{}: waiting for result...", job.provider_label));
                }
                JobState::Succeeded { result_url } => {
                    pb.finish_with_message(format!(
                        "{} {} → {result_url}",
                        self.green.apply_to("✓"),
                        job.provider_label
                    ));
                }
                JobState::Failed { reason } => {
                    pb.finish_with_message(format!(
                        "{} {} — {reason}",
                        self.red.apply_to("✗"),
                        job.provider_label
                    ));
                }
            }
        }
    }

    /// Imprime uma observação acima das barras (erros transitórios, avisos).
    pub fn note(&self, msg: &str) {
        let _ = self
            .multi
            .println(format!("  {} {msg}", self.yellow.apply_to("!")));
    }

    /// Encerra as barras restantes e imprime o resumo da rodada.
    pub fn finish(&self, registry: &Registry, outcome: RunOutcome) {
        for job in registry.jobs() {
            if let Some(pb) = self.bars.get(&job.job_id)
                && !pb.is_finished()
            {
                pb.finish_with_message(format!(
                    "{} {}: still pending",
                    self.yellow.apply_to("…"),
                    job.provider_label
                ));
            }
        }

        let (succeeded, failed, pending) = registry.tally();
        let headline = match outcome {
            RunOutcome::Complete => self.green.apply_to("Run complete").to_string(),
            RunOutcome::TimedOut => self.yellow.apply_to("Run timed out").to_string(),
        };
        println!();
        println!("{headline} — {succeeded} succeeded, {failed} failed, {pending} still pending");

        for job in registry.jobs() {
            match &job.state {
                JobState::Succeeded { result_url } => {
                    println!("  {} {}: {result_url}", self.green.apply_to("✓"), job.provider_label);
                }
                JobState::Failed { reason } => {
                    println!("  {} {}: {reason}", self.red.apply_to("✗"), job.provider_label);
                }
                JobState::Pending => {
                    println!(
                        "  {} {}: no notification before the deadline",
                        self.yellow.apply_to("…"),
                        job.provider_label
                    );
                }
            }
        }
    }
}

/// Imprime as entradas recentes da galeria, mais novas primeiro.
pub fn print_gallery(entries: &[GalleryEntry]) {
    if entries.is_empty() {
        println!("Gallery is empty.");
        return;
    }

    let dim = Style::new().dim();
    let bold = Style::new().bold();
    for entry in entries {
        println!(
            "{} {} [{}]",
            dim.apply_to(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            bold.apply_to(&entry.image_url),
            entry.engine
        );
        let prompt = entry.prompt.replace('\n', " ");
        let short: String = prompt.chars().take(100).collect();
        println!("    {}", dim.apply_to(short));
    }
}
