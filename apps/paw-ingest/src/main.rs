use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = paw_ingest::Args::parse();
	paw_ingest::run(args).await
}
