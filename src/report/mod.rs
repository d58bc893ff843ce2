//! Executive report assembled from every persisted artifact

pub mod markdown;

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{ChecklistItem, PlatformSelection, ProgressRecord, TARGET_PLATFORM};

use markdown::{bold, bullet_list, heading, image, paragraph, rule, table, task_item};

pub const REPORT_FILE: &str = "relatorio_executivo_dashmigrate.md";

const PROJECT_NAME: &str = "DashMigrate Pro+";
const EMPTY_SECTION: &str = "_Nenhum conteúdo gerado nesta etapa._";

/// Everything the report reads, gathered by the export step
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub platform: PlatformSelection,
    pub ocr_text: String,
    pub script_text: String,
    pub comparison_text: String,
    pub checklist: Vec<ChecklistItem>,
    pub progress: ProgressRecord,
    pub source_image: Option<PathBuf>,
    pub target_image: Option<PathBuf>,
    pub generated_at: DateTime<Local>,
}

/// Produces a report artifact in `out_dir` and returns its path
pub trait ReportExporter: Send + Sync {
    fn export(&self, input: &ReportInput, out_dir: &Path) -> io::Result<PathBuf>;
}

/// Writes the report as a single Markdown document
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownReportExporter;

impl MarkdownReportExporter {
    pub fn render(&self, input: &ReportInput) -> String {
        let origin = input.platform.origin_or_default();
        let mut doc = heading(1, "Relatório Executivo de Migração de Dashboard");

        doc.push_str(&bullet_list(&[
            format!("{} {PROJECT_NAME}", bold("Projeto:")),
            format!(
                "{} {}",
                bold("Data da Migração:"),
                input.generated_at.format("%d/%m/%Y")
            ),
            format!("{} {}", bold("Plataforma Origem:"), describe_origin(&input.platform)),
            format!("{} {}", bold("Plataforma Destino:"), describe_target(&input.platform)),
            format!("{} __________________________", bold("Analista Responsável:")),
        ]));
        doc.push_str(&rule());

        doc.push_str(&heading(2, "Resumo Executivo"));
        doc.push_str(&paragraph(&format!(
            "Este relatório apresenta a análise completa da migração de um dashboard da \
             plataforma {origin} para o {TARGET_PLATFORM}, incluindo os resultados da extração \
             visual, validação dos dados, roteiro técnico, comparação visual e checklist final \
             de qualidade."
        )));

        doc.push_str(&heading(3, "Status das Etapas"));
        let rows: Vec<Vec<String>> = input
            .progress
            .entries()
            .into_iter()
            .map(|(step, done)| {
                vec![
                    step.name().to_string(),
                    if done { "✅ Completa" } else { "⏳ Pendente" }.to_string(),
                ]
            })
            .collect();
        doc.push_str(&table(&["Etapa", "Status"], &rows));

        doc.push_str(&heading(2, "Comparação Visual dos Dashboards"));
        match (&input.source_image, &input.target_image) {
            (None, None) => doc.push_str(&paragraph(EMPTY_SECTION)),
            (source, target) => {
                if let Some(path) = source {
                    doc.push_str(&image(
                        &format!("Dashboard Original ({origin})"),
                        &path.display().to_string(),
                    ));
                }
                if let Some(path) = target {
                    doc.push_str(&image(
                        &format!("Dashboard Novo ({TARGET_PLATFORM})"),
                        &path.display().to_string(),
                    ));
                }
            }
        }

        doc.push_str(&heading(2, "Componentes Migrados - Visão Inicial"));
        doc.push_str(&section_body(&input.ocr_text));

        doc.push_str(&heading(2, "Roteiro Técnico de Migração"));
        doc.push_str(&section_body(&input.script_text));

        doc.push_str(&heading(2, "Checklist de Verificação e Comparação Final"));
        if !input.checklist.is_empty() {
            for item in &input.checklist {
                doc.push_str(&task_item(&item.label, item.checked));
            }
            doc.push('\n');
        }
        doc.push_str(&section_body(&input.comparison_text));

        doc.push_str(&heading(2, "Considerações Finais"));
        doc.push_str(&paragraph(&format!(
            "Recomenda-se revisar os componentes marcados como parcialmente compatíveis ou \
             incompatíveis e aplicar os ajustes listados no roteiro técnico. A abordagem \
             automatizada do {PROJECT_NAME} facilita a reprodutibilidade e padroniza o processo \
             de migração de dashboards."
        )));
        doc
    }
}

impl ReportExporter for MarkdownReportExporter {
    fn export(&self, input: &ReportInput, out_dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(REPORT_FILE);
        std::fs::write(&path, self.render(input))?;
        tracing::info!(path = %path.display(), "Report exported");
        Ok(path)
    }
}

fn describe_origin(platform: &PlatformSelection) -> String {
    let origin = platform.origin_or_default();
    if platform.origin_version.is_empty() {
        origin.to_string()
    } else {
        format!("{origin} ({})", platform.origin_version)
    }
}

fn describe_target(platform: &PlatformSelection) -> String {
    if platform.target_version.is_empty() {
        TARGET_PLATFORM.to_string()
    } else {
        platform.target_version.clone()
    }
}

fn section_body(text: &str) -> String {
    if text.trim().is_empty() {
        paragraph(EMPTY_SECTION)
    } else {
        paragraph(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepId;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_input() -> ReportInput {
        let mut progress = ProgressRecord::default();
        progress.set_complete(StepId::Platform);
        ReportInput {
            platform: PlatformSelection {
                origin: "Tableau".to_string(),
                origin_version: "2023.3".to_string(),
                target_version: "Power BI Pro".to_string(),
                model_display: "OpenAI - GPT-4o".to_string(),
                model: "gpt-4o".to_string(),
            },
            ocr_text: "Gráfico de vendas".to_string(),
            script_text: String::new(),
            comparison_text: "Tudo compatível".to_string(),
            checklist: vec![ChecklistItem {
                label: "KPI de receita".to_string(),
                checked: true,
            }],
            progress,
            source_image: Some(PathBuf::from("data/uploaded_image.png")),
            target_image: None,
            generated_at: Local.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_sections() {
        let doc = MarkdownReportExporter.render(&sample_input());
        assert!(doc.starts_with("# Relatório Executivo de Migração de Dashboard"));
        assert!(doc.contains("05/03/2024"));
        assert!(doc.contains("Tableau (2023.3)"));
        assert!(doc.contains("| Platform selection | ✅ Completa |"));
        assert!(doc.contains("| Final export | ⏳ Pendente |"));
        assert!(doc.contains("![Dashboard Original (Tableau)](data/uploaded_image.png)"));
        assert!(doc.contains("- [x] KPI de receita"));
        assert!(doc.contains("Tudo compatível"));
        // empty script section gets a placeholder
        assert!(doc.contains(EMPTY_SECTION));
    }

    #[test]
    fn test_export_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("output");
        let path = MarkdownReportExporter
            .export(&sample_input(), &out_dir)
            .unwrap();

        assert_eq!(path, out_dir.join(REPORT_FILE));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("Considerações Finais"));
    }
}
