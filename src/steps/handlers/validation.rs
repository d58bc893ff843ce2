use async_trait::async_trait;
use std::path::Path;

use super::{unsupported, StepHandler};
use crate::datasource::{ConnectorError, DataSource, FileSource, TabularData};
use crate::steps::prompts;
use crate::steps::{LoadedDataset, Readiness, StepAction, StepError, StepId, Transition};
use crate::store::is_dataset_file;
use crate::wizard::Wizard;

/// Dataset loading and compatibility analysis against the extraction
pub struct ValidationHandler;

impl ValidationHandler {
    fn load_upload(
        &self,
        wizard: &mut Wizard,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Transition, StepError> {
        if !is_dataset_file(Path::new(file_name)) {
            return Err(ConnectorError::UnsupportedFormat(file_name.to_string()).into());
        }

        // parse before replacing anything, so a bad re-upload keeps the old file
        let staged = wizard.store().stage_upload(file_name, bytes)?;
        let table = match FileSource::new(&staged).load() {
            Ok(table) => table,
            Err(e) => {
                wizard.store().discard_upload(&staged);
                return Err(e.into());
            }
        };
        wizard.store().commit_upload(&staged)?;

        self.set_dataset(wizard, file_name.to_string(), table);
        Ok(Transition::Stay)
    }

    fn load_source(
        &self,
        wizard: &mut Wizard,
        source: &dyn DataSource,
    ) -> Result<Transition, StepError> {
        let table = source.load()?;
        self.set_dataset(wizard, source.describe(), table);
        Ok(Transition::Stay)
    }

    fn set_dataset(&self, wizard: &mut Wizard, source: String, table: TabularData) {
        tracing::info!(
            source = %source,
            columns = table.columns.len(),
            rows = table.row_count(),
            "Dataset loaded"
        );
        let session = wizard.session_mut();
        session.dataset = Some(LoadedDataset { source, table });
        session.analysis = None;
    }

    async fn analyze(&self, wizard: &mut Wizard) -> Result<Transition, StepError> {
        let columns = match &wizard.session().dataset {
            Some(dataset) => dataset.table.column_list(),
            None => return Err(StepError::MissingInput("no dataset loaded".to_string())),
        };
        let ocr_text = wizard.ocr_text()?;

        let prompt = prompts::compatibility(&ocr_text, &columns);
        let analysis = wizard
            .ask(prompt, Vec::new(), prompts::ANALYSIS_TEMPERATURE)
            .await?;
        wizard.session_mut().analysis = Some(analysis);
        Ok(Transition::Stay)
    }
}

#[async_trait]
impl StepHandler for ValidationHandler {
    fn step(&self) -> StepId {
        StepId::Validation
    }

    fn readiness(&self, wizard: &Wizard) -> Readiness {
        if wizard.session().dataset.is_none() {
            return Readiness::Blocked("load a CSV or Excel dataset first".to_string());
        }
        match wizard.ocr_text() {
            Ok(text) if text.trim().is_empty() => Readiness::Warning(
                "no extraction text; the analysis will only see the columns".to_string(),
            ),
            Ok(_) => Readiness::Ready,
            Err(e) => Readiness::Warning(e.to_string()),
        }
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        let session = wizard.session();
        if session.dataset.is_none() {
            Err("load a dataset first".to_string())
        } else if session.analysis.is_none() {
            Err("run the compatibility analysis first".to_string())
        } else {
            Ok(())
        }
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::LoadDataset { file_name, bytes } => {
                self.load_upload(wizard, &file_name, &bytes)
            }
            StepAction::LoadDatasetFrom(source) => self.load_source(wizard, source.as_ref()),
            StepAction::AnalyzeData => self.analyze(wizard).await,
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
