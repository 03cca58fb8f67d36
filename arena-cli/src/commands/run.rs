//! `run` command

use anyhow::Result;
use arena_core::{BatchRequest, BatchRun, CombinationOutcome, RecordSource};
use arena_metrics::{summarize, BatchStatistics, Summary};
use arena_workflow::{CombinationProgress, Dispatcher, ProgressStatus};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color};
use indicatif::ProgressBar;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::cli::RunArgs;
use crate::context::Context;
use crate::output::{
    format_cost, format_latency, format_timestamp, print_field, print_list_field, print_section,
    status_badge, truncate, OutputFormat, TableDisplay,
};

const NOTE_WIDTH: usize = 48;

/// Execute a batch and render the results
pub async fn execute(ctx: &Context, args: RunArgs) -> Result<()> {
    let registry = Arc::new(ctx.create_registry()?);
    let dispatcher = Dispatcher::new(registry, &ctx.config.dispatch);
    let request = BatchRequest::new(args.task, args.frameworks, args.models);

    let total = request.combinations().len();
    if total == 0 {
        ctx.output.warning("No combinations selected.");
    }

    let run = if args.progress && total > 0 {
        let events = dispatcher.enable_progress_tracking().await;
        let bar = ctx.output.progress_bar(total as u64, "Running combinations");
        let run = run_with_progress(&dispatcher, &request, events, &bar).await;
        bar.finish_and_clear();
        run
    } else {
        dispatcher.run_batch(&request).await
    };

    let summary = summarize(&run.outcomes);
    let statistics = BatchStatistics::from_outcomes(&run.outcomes);

    match ctx.output_format {
        OutputFormat::Json => ctx.output.write_json(&BatchReport {
            run: &run,
            summary: &summary,
            statistics: &statistics,
        }),
        OutputFormat::Table => {
            render_table(ctx, &run, &summary, &statistics, args.details);
            Ok(())
        }
    }
}

async fn run_with_progress(
    dispatcher: &Dispatcher,
    request: &BatchRequest,
    mut events: broadcast::Receiver<CombinationProgress>,
    bar: &ProgressBar,
) -> BatchRun {
    let batch = dispatcher.run_batch(request);
    tokio::pin!(batch);
    let mut listening = true;

    loop {
        tokio::select! {
            run = &mut batch => return run,
            event = events.recv(), if listening => match event {
                Ok(event) => apply_progress(bar, &event),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => listening = false,
            },
        }
    }
}

fn apply_progress(bar: &ProgressBar, event: &CombinationProgress) {
    match event.status {
        ProgressStatus::Started => bar.set_message(event.combination.to_string()),
        ProgressStatus::Completed => bar.inc(1),
        ProgressStatus::Failed => {
            bar.inc(1);
            bar.println(format!("{} {}", status_badge("failed"), event.combination));
        }
    }
}

#[derive(Serialize)]
struct BatchReport<'a> {
    #[serde(flatten)]
    run: &'a BatchRun,
    summary: &'a Summary,
    statistics: &'a BatchStatistics,
}

/// Displayable outcome for output
struct OutcomeDisplay<'a>(&'a CombinationOutcome);

fn source_label(source: RecordSource) -> &'static str {
    match source {
        RecordSource::Live => "live",
        RecordSource::Mock => "mock",
        RecordSource::Unavailable => "unavailable",
    }
}

impl TableDisplay for OutcomeDisplay<'_> {
    fn to_row(&self) -> Vec<Cell> {
        let outcome = self.0;
        let record = &outcome.record;
        let note = match &record.error {
            Some(error) => Cell::new(truncate(error, NOTE_WIDTH)).fg(Color::Red),
            None => Cell::new(truncate(&record.output, NOTE_WIDTH)),
        };

        vec![
            Cell::new(outcome.index),
            Cell::new(&outcome.combination.framework),
            Cell::new(&outcome.combination.model),
            Cell::new(status_badge(source_label(record.source))),
            Cell::new(format_latency(outcome.latency_ms)).set_alignment(CellAlignment::Right),
            Cell::new(record.tokens).set_alignment(CellAlignment::Right),
            Cell::new(format_cost(record.cost)).set_alignment(CellAlignment::Right),
            Cell::new(record.quality).set_alignment(CellAlignment::Right),
            Cell::new(record.coverage).set_alignment(CellAlignment::Right),
            Cell::new(record.safety).set_alignment(CellAlignment::Right),
            note,
        ]
    }

    fn display_single(&self) {
        let outcome = self.0;
        let record = &outcome.record;

        print_section(&format!("#{} {}", outcome.index, outcome.combination));
        print_field("Source", &status_badge(source_label(record.source)));
        if let Some(error) = &record.error {
            print_field("Error", error);
        }
        print_list_field("Steps", &record.steps);
        if !record.output.is_empty() {
            println!("  {}:", "Output".cyan());
            for line in record.output.lines() {
                println!("    {}", line);
            }
        }
    }
}

fn render_table(
    ctx: &Context,
    run: &BatchRun,
    summary: &Summary,
    statistics: &BatchStatistics,
    details: bool,
) {
    let rows: Vec<OutcomeDisplay> = run.outcomes.iter().map(OutcomeDisplay).collect();
    ctx.output.write_table(
        &rows,
        &[
            "#", "Framework", "Model", "Source", "Latency", "Tokens", "Cost", "Quality",
            "Coverage", "Safety", "Output",
        ],
    );

    if details {
        for row in &rows {
            row.display_single();
        }
    }

    print_section("Highlights");
    match summary {
        Summary::NoData => {
            ctx.output
                .warning("No combination succeeded; highlights are unavailable.");
        }
        Summary::Available(h) => {
            print_field(
                "Fastest",
                &format!("{} ({})", h.fastest.combination, format_latency(h.fastest.value)),
            );
            print_field(
                "Cheapest",
                &format!("{} ({})", h.cheapest.combination, format_cost(h.cheapest.value)),
            );
            print_field(
                "Highest quality",
                &format!("{} ({})", h.highest_quality.combination, h.highest_quality.value),
            );
            print_field("Average tokens", &h.average_tokens.to_string());
            print_field(
                "Valid combinations",
                &format!("{} of {}", h.valid_count, run.outcomes.len()),
            );
        }
    }

    print_section("Batch");
    print_field("ID", &run.id.to_string());
    print_field("Started", &format_timestamp(&run.started_at));
    print_field("Completed", &format_timestamp(&run.completed_at));
    print_field(
        "Sources",
        &format!(
            "{} live, {} mock, {} failed",
            statistics.live, statistics.mock, statistics.failed
        ),
    );
    if statistics.latency_ms.count > 0 {
        print_field(
            "Latency (ms)",
            &format!(
                "median {} / p90 {} / p95 {} / max {}",
                statistics.latency_ms.median.round_dp(1),
                statistics.latency_ms.p90.round_dp(1),
                statistics.latency_ms.p95.round_dp(1),
                statistics.latency_ms.max.round_dp(1)
            ),
        );
    }
    let total_cost: Decimal = run.records().map(|record| record.cost).sum();
    print_field("Total cost", &format_cost(total_cost));

    ctx.output.info(&format!("{} combination(s) settled.", run.outcomes.len()));
}
