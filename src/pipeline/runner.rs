use rand::rngs::SmallRng;
use tracing::debug;

use crate::foundation::error::{StitchError, StitchResult};
use crate::pipeline::context::{MergeContext, ProgressFn, ProgressInfo};

/// Options that can vet themselves before a pipeline runs.
pub trait ValidateOptions {
    /// Check every declared constraint, reporting the first violation as a
    /// [`StitchError::Validation`].
    fn validate(&self) -> StitchResult<()>;
}

/// One stage of a merge.
///
/// Steps receive their own clone of the options so no stage can leak edits
/// into a later one. Returning `Some(buffer)` ends the pipeline with that
/// encoded output.
pub type StepFn<O, S> = fn(
    &mut MergeContext<S>,
    O,
    &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>>;

/// An ordered list of steps run against a shared [`MergeContext`].
///
/// Construction validates the options up front; [`MergePipeline::run`]
/// executes the steps in order, stops at the first error, and returns the
/// buffer produced by the terminal step.
pub struct MergePipeline<'p, O, S> {
    options: O,
    context: MergeContext<S>,
    steps: Vec<StepFn<O, S>>,
    on_progress: Option<ProgressFn<'p>>,
}

impl<'p, O, S> MergePipeline<'p, O, S>
where
    O: ValidateOptions + Clone,
    S: Default,
{
    /// Validate `options` and set up a context over `inputs`.
    pub fn new(
        inputs: Vec<Vec<u8>>,
        options: O,
        on_progress: Option<ProgressFn<'p>>,
    ) -> StitchResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            context: MergeContext::new(inputs),
            steps: Vec::new(),
            on_progress,
        })
    }

    /// As [`MergePipeline::new`], with a caller-seeded RNG.
    pub fn with_rng(
        inputs: Vec<Vec<u8>>,
        options: O,
        on_progress: Option<ProgressFn<'p>>,
        rng: SmallRng,
    ) -> StitchResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            context: MergeContext::with_rng(inputs, rng),
            steps: Vec::new(),
            on_progress,
        })
    }

    /// Append a step to the end of the pipeline.
    pub fn step(mut self, step: StepFn<O, S>) -> Self {
        self.steps.push(step);
        self
    }

    /// Run the steps in order and return the final encoded output.
    ///
    /// Exactly one step is expected to produce the output; falling off the
    /// end of the list without one is a wiring defect.
    pub fn run(mut self) -> StitchResult<Vec<u8>> {
        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            debug!(step = index + 1, total, "running merge step");
            if let Some(output) =
                step(&mut self.context, self.options.clone(), &mut self.on_progress)?
            {
                return Ok(output);
            }
        }
        Err(StitchError::internal(
            "no merge step produced a final image",
        ))
    }

    /// Read-only view of the current progress counters.
    pub fn progress(&self) -> &ProgressInfo {
        &self.context.progress
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/runner.rs"]
mod tests;
