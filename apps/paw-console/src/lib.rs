//! Interactive console for the pipeline. One question per line, node progress
//! printed as the run advances.

use std::{
	io::{self, BufRead, Write},
	path::PathBuf,
	sync::Arc,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use paw_agent::{DocumentRetriever, PawAgent, Providers, RunOptions};
use paw_providers::HttpProviders;
use paw_retrieval::QdrantIndex;

#[derive(Debug, Parser)]
#[command(
	version = paw_cli::VERSION,
	rename_all = "kebab",
	styles = paw_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = paw_config::load(&args.config)?;
	init_tracing(&config);
	let agent = build_agent(config)?;
	let stdin = io::stdin();
	let mut stdout = io::stdout();

	println!("Ask a pet care question, or type \"exit\" to quit.");

	loop {
		print!("> ");
		stdout.flush()?;

		let mut line = String::new();

		if stdin.lock().read_line(&mut line)? == 0 {
			break;
		}

		let question = line.trim();

		if question.is_empty() {
			continue;
		}
		if matches!(question, "exit" | "quit" | "q") {
			break;
		}

		let result = agent
			.run_with(question, RunOptions::default(), |node, _| {
				println!("[{node}]");
			})
			.await;

		// A failed run leaves the console alive for the next question.
		match result {
			Ok(run) => println!("\n{}\n", run.answer().unwrap_or("(no answer)")),
			Err(err) => eprintln!("\nerror: {err}\n"),
		}
	}

	Ok(())
}

fn build_agent(config: paw_config::Config) -> color_eyre::Result<PawAgent> {
	let http = Arc::new(HttpProviders);
	let providers = Providers::new(http.clone(), http.clone());
	let retriever = match config.storage.qdrant.as_ref() {
		Some(qdrant) => {
			let index = QdrantIndex::new(
				qdrant,
				http,
				config.providers.embedding.clone(),
				config.retrieval.top_k,
			)?;

			Some(Arc::new(index) as Arc<dyn DocumentRetriever>)
		},
		None => {
			tracing::warn!("No vector index configured; running without local retrieval.");

			None
		},
	};

	Ok(PawAgent::new(config, providers, retriever))
}

fn init_tracing(config: &paw_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}
