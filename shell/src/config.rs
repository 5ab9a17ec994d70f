use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pipesh")]
#[command(about = "A small interactive shell with pipelines, redirections and background jobs")]
pub struct Options {
	/// Do not print the login banner or the prompt
	#[arg(short = 'n', default_value_t = false)]
	pub quiet: bool,
}

impl Options {
	pub fn show_context(&self) -> bool {
		!self.quiet
	}
}

pub fn init_logging() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
}
