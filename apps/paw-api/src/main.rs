use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = paw_api::Args::parse();
	paw_api::run(args).await
}
