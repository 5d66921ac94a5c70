// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train` — trains on n-digit addition, then grades
//                the model on both splits
//   2. `exam`  — grades a saved checkpoint on one split
//   3. `solve` — asks a saved checkpoint for one sum
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ExamArgs, SolveArgs, TrainArgs};

use crate::ml::evaluator::ExamReport;
use crate::ml::sampler::SampleStrategy;

#[derive(Parser, Debug)]
#[command(
    name = "digit-adder",
    version = "0.1.0",
    about = "Train a small GPT to add n-digit integers, then grade it."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Exam(args)  => run_exam(args),
            Commands::Solve(args) => run_solve(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!(
        "Starting training on {}-digit addition, checkpoints in: {}",
        args.ndigit,
        args.checkpoint_dir
    );

    let use_case = TrainUseCase::new(args.into());
    let outcome  = use_case.execute()?;

    println!("Training complete. Best checkpoint saved.");
    print_report("train", &outcome.train_exam);
    print_report("test",  &outcome.test_exam);
    Ok(())
}

fn run_exam(args: ExamArgs) -> Result<()> {
    use crate::application::exam_use_case::ExamUseCase;

    let use_case = ExamUseCase::new(&args.checkpoint_dir)?;
    let report   = use_case.execute(args.split, args.batch_size, args.max_batches)?;
    print_report(&args.split.to_string(), &report);
    Ok(())
}

fn run_solve(args: SolveArgs) -> Result<()> {
    use crate::application::solve_use_case::SolveUseCase;

    let strategy = match args.top_k {
        Some(k) => SampleStrategy::TopK {
            k,
            temperature: args.temperature,
            seed:        args.sample_seed,
        },
        None => SampleStrategy::Greedy,
    };

    let use_case = SolveUseCase::from_checkpoint(&args.checkpoint_dir, strategy)?;
    let answer   = use_case.answer(args.a, args.b)?;

    let verdict = if answer.is_correct() { "correct" } else { "wrong" };
    println!(
        "\n{} + {} = {}  ({}, truth is {})",
        args.a, args.b, answer.predicted, verdict, answer.problem.sum()
    );
    Ok(())
}

fn print_report(split: &str, report: &ExamReport) {
    for mistake in &report.mistakes {
        println!("{mistake}");
    }
    println!("[{split}] {report}");
}
