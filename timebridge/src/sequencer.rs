//! Ordered step execution for creating one destination row.

use crate::autocomplete;
use crate::batch::{self, ROW_WIDTH};
use crate::config::SettleConfig;
use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::types::{
    parse_rendered_hours, FieldVerification, SequenceResult, StepResult, TimeEntryRequest,
};
use crate::writer;
use crate::Page;
use tracing::{error, info, instrument};

const STEP_CREATE_ROW: &str = "create_row";
const STEP_RESOLVE_PROJECT: &str = "resolve_project";
const STEP_FILL_SERVICE: &str = "fill_service";
const STEP_SAVE_ROW: &str = "save_row";
const STEP_FILL_HOURS: &str = "fill_hours";

// Destination contract: control labels this sequencer matches on.
const NEW_ROW_LABEL: &str = "new row";
const SAVE_ROW_LABEL: &str = "save row";
const PROJECT_INPUT_LABEL: &str = "Add a client or project";
const SERVICE_INPUT_LABEL: &str = "Add a service";
const DURATION_INPUT_LABEL: &str = "Duration";

/// Drives the fixed five-step flow that lands one weekly row in the
/// destination: create row, resolve project, fill service, save row, fill
/// hours. Fail-fast: the first failed step ends the run with the partial
/// step log, and a partially created row is left as-is for manual
/// inspection. Never returns an error or panics across its API; every
/// outcome is a [`SequenceResult`].
pub struct TimeEntrySequencer {
    page: Page,
    config: SettleConfig,
}

impl TimeEntrySequencer {
    pub fn new(page: Page) -> Self {
        Self::with_config(page, SettleConfig::default())
    }

    pub fn with_config(page: Page, config: SettleConfig) -> Self {
        Self { page, config }
    }

    #[instrument(skip(self, request), fields(project = %request.project_query))]
    pub async fn run(&self, request: &TimeEntryRequest) -> SequenceResult {
        let requested_total = request.hours_by_day.total();
        let mut steps = Vec::new();

        if let Err(e) = self.create_row().await {
            steps.push(StepResult::failed(STEP_CREATE_ROW, &e));
            return Self::failed(steps, requested_total, e);
        }
        steps.push(StepResult::ok(STEP_CREATE_ROW));

        let selected = match self.resolve_project(&request.project_query).await {
            Ok(selected) => selected,
            Err(e) => {
                steps.push(StepResult::failed(STEP_RESOLVE_PROJECT, &e));
                return Self::failed(steps, requested_total, e);
            }
        };
        steps.push(StepResult::ok_with(
            STEP_RESOLVE_PROJECT,
            serde_json::json!({ "selected": selected }),
        ));

        if let Err(e) = self.fill_service(&request.service_query).await {
            steps.push(StepResult::failed(STEP_FILL_SERVICE, &e));
            return Self::failed(steps, requested_total, e);
        }
        steps.push(StepResult::ok(STEP_FILL_SERVICE));

        if let Err(e) = self.save_row().await {
            steps.push(StepResult::failed(STEP_SAVE_ROW, &e));
            return Self::failed(steps, requested_total, e);
        }
        steps.push(StepResult::ok(STEP_SAVE_ROW));

        let verification = match self.fill_hours(request).await {
            Ok(verification) => verification,
            Err(e) => {
                steps.push(StepResult::failed(STEP_FILL_HOURS, &e));
                return Self::failed(steps, requested_total, e);
            }
        };
        let mismatches = verification.iter().filter(|v| !v.matches()).count();
        steps.push(StepResult::ok_with(
            STEP_FILL_HOURS,
            serde_json::json!({ "mismatches": mismatches }),
        ));

        let verified_total = verification
            .iter()
            .filter_map(|v| parse_rendered_hours(&v.actual))
            .sum::<f64>();

        let message = format!(
            "Created {}/{} with {}h",
            request.project_query, request.service_query, requested_total
        );
        info!(%message, mismatches, "sequence complete");

        SequenceResult {
            success: true,
            steps,
            verification,
            requested_total,
            verified_total: Some(verified_total),
            message,
            error: None,
            diagnostic: None,
        }
    }

    fn failed(
        steps: Vec<StepResult>,
        requested_total: f64,
        e: AutomationError,
    ) -> SequenceResult {
        let step = steps
            .last()
            .map(|s| s.step.clone())
            .unwrap_or_default();
        error!(%step, error = %e, "sequence stopped");
        SequenceResult {
            success: false,
            steps,
            verification: Vec::new(),
            requested_total,
            verified_total: None,
            message: format!("Stopped at {step}: {e}"),
            error: Some(e.to_string()),
            diagnostic: Some(format!("{e:?}")),
        }
    }

    /// Locate a button whose visible text contains `needle`,
    /// case-insensitively, first match in document order.
    fn button_containing(&self, needle: &str) -> Result<UiElement, AutomationError> {
        let needle = needle.to_lowercase();
        self.page
            .locator("role:button")
            .all()?
            .into_iter()
            .find(|b| {
                b.text()
                    .map(|t| t.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                AutomationError::ControlNotFound(format!("no button containing {needle:?}"))
            })
    }

    fn labeled_input(&self, label: &str) -> Result<UiElement, AutomationError> {
        self.page
            .locator(crate::Selector::Label(label.to_string()))
            .first()
            .map_err(|_| AutomationError::ControlNotFound(format!("no input labeled {label:?}")))
    }

    async fn create_row(&self) -> Result<(), AutomationError> {
        self.button_containing(NEW_ROW_LABEL)?.click()?;
        self.page.settle(self.config.after_create_row).await;
        Ok(())
    }

    async fn resolve_project(&self, query: &str) -> Result<String, AutomationError> {
        let input = self.labeled_input(PROJECT_INPUT_LABEL)?;
        autocomplete::resolve(&self.page, &input, query, &self.config).await
    }

    async fn fill_service(&self, service: &str) -> Result<(), AutomationError> {
        let input = self.labeled_input(SERVICE_INPUT_LABEL)?;
        input.focus()?;
        writer::write(&input, service)?;
        self.page.settle(self.config.after_service).await;
        Ok(())
    }

    async fn save_row(&self) -> Result<(), AutomationError> {
        self.button_containing(SAVE_ROW_LABEL)?.click()?;
        self.page.settle(self.config.after_save).await;
        Ok(())
    }

    /// The most recently created row's duration inputs are the last 7
    /// enabled ones in document order.
    async fn fill_hours(
        &self,
        request: &TimeEntryRequest,
    ) -> Result<Vec<FieldVerification>, AutomationError> {
        let mut inputs = Vec::new();
        for input in self.labeled_inputs(DURATION_INPUT_LABEL)? {
            if input.is_enabled()? {
                inputs.push(input);
            }
        }
        let row = if inputs.len() > ROW_WIDTH {
            inputs.split_off(inputs.len() - ROW_WIDTH)
        } else {
            inputs
        };
        batch::fill_row(&self.page, &row, &request.hours_by_day, &self.config).await
    }

    fn labeled_inputs(&self, label: &str) -> Result<Vec<UiElement>, AutomationError> {
        self.page
            .locator(crate::Selector::Label(label.to_string()))
            .all()
    }
}
