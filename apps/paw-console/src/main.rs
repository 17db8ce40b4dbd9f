use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = paw_console::Args::parse();
	paw_console::run(args).await
}
