use super::*;
use crate::foundation::error::StitchError;

/// Route the per-step `debug!` lines into the test harness output.
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Clone, Default)]
struct TestOptions {
    fail_validation: bool,
    tag: u32,
}

impl ValidateOptions for TestOptions {
    fn validate(&self) -> StitchResult<()> {
        if self.fail_validation {
            return Err(StitchError::validation("tag must be set"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct TestState {
    seen_tags: Vec<u32>,
}

fn record_tag(
    ctx: &mut MergeContext<TestState>,
    options: TestOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    ctx.state.seen_tags.push(options.tag);
    Ok(None)
}

fn mutate_options(
    ctx: &mut MergeContext<TestState>,
    mut options: TestOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    options.tag = 999;
    ctx.state.seen_tags.push(options.tag);
    Ok(None)
}

fn finish(
    _ctx: &mut MergeContext<TestState>,
    _options: TestOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    Ok(Some(vec![1, 2, 3]))
}

fn explode(
    _ctx: &mut MergeContext<TestState>,
    _options: TestOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    Err(StitchError::internal("step exploded"))
}

#[test]
fn construction_rejects_invalid_options() {
    let options = TestOptions {
        fail_validation: true,
        tag: 0,
    };
    let result = MergePipeline::<TestOptions, TestState>::new(Vec::new(), options, None);
    match result {
        Err(StitchError::Validation(message)) => assert_eq!(message, "tag must be set"),
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn steps_run_in_order_and_the_terminal_step_ends_the_run() {
    init_test_tracing();
    let options = TestOptions {
        fail_validation: false,
        tag: 7,
    };
    let output = MergePipeline::new(Vec::new(), options, None)
        .unwrap()
        .step(record_tag)
        .step(finish)
        .step(explode)
        .run()
        .unwrap();
    assert_eq!(output, vec![1, 2, 3]);
}

fn expect_original_tag(
    _ctx: &mut MergeContext<TestState>,
    options: TestOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    if options.tag != 7 {
        return Err(StitchError::internal("options leaked between steps"));
    }
    Ok(Some(vec![42]))
}

#[test]
fn each_step_gets_a_fresh_clone_of_the_options() {
    let options = TestOptions {
        fail_validation: false,
        tag: 7,
    };
    let output = MergePipeline::new(Vec::new(), options, None)
        .unwrap()
        .step(mutate_options)
        .step(expect_original_tag)
        .run()
        .unwrap();
    assert_eq!(output, vec![42]);
}

#[test]
fn errors_stop_the_run_immediately() {
    init_test_tracing();
    let options = TestOptions::default();
    let err = MergePipeline::new(Vec::new(), options, None)
        .unwrap()
        .step(explode)
        .step(finish)
        .run()
        .unwrap_err();
    assert_eq!(err.to_string(), "internal error: step exploded");
}

#[test]
fn empty_pipelines_report_the_missing_terminal_step() {
    let err = MergePipeline::<TestOptions, TestState>::new(Vec::new(), TestOptions::default(), None)
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "internal error: no merge step produced a final image"
    );
}

#[test]
fn progress_starts_at_zero_over_the_input_count() {
    let inputs = vec![vec![0u8], vec![1u8], vec![2u8]];
    let pipeline =
        MergePipeline::<TestOptions, TestState>::new(inputs, TestOptions::default(), None).unwrap();
    let progress = pipeline.progress();
    assert_eq!((progress.completed, progress.total), (0, 3));
    assert_eq!(progress.phase, "Initializing");
}

#[test]
fn progress_observer_sees_each_bump() {
    let mut seen: Vec<(usize, usize)> = Vec::new();
    {
        let mut observer = |info: &ProgressInfo| seen.push((info.completed, info.total));
        let mut on_progress: Option<ProgressFn<'_>> = Some(&mut observer);
        let mut ctx: MergeContext<TestState> =
            MergeContext::new(vec![vec![0u8], vec![1u8]]);
        ctx.bump_progress("Merging images", &mut on_progress);
        ctx.bump_progress("Merging images", &mut on_progress);
    }
    assert_eq!(seen, vec![(1, 2), (2, 2)]);
}
