use clap::Parser;
use paperscope::api::PaperscopeClient;
use paperscope::cli::{
    analyze, backends, handle_completions, handle_config_init, health, load_config,
    BackendsCommands, Cli, Commands, ConfigCommands,
};
use paperscope::config::PaperscopeConfig;
use std::error::Error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    let config = match cli.command.config_path() {
        Some(path) => {
            let config = load_config(path, cli.log_level.as_deref())?;
            if let Err(e) = paperscope::logging::init_tracing(&config.logging) {
                eprintln!("Warning: failed to initialize logging: {}", e);
            }
            tracing::debug!(
                config = %path.display(),
                backends = config.backends.len(),
                "Configuration loaded"
            );
            config
        }
        None => PaperscopeConfig::default(),
    };

    match cli.command {
        Commands::Backends(BackendsCommands::List(args)) => {
            backends::handle_backends_list(&args, &config.registry()?)
        }
        Commands::Health(args) => {
            health::handle_health(&args, &config.registry()?, &config.probe).await
        }
        Commands::Analyze(args) => {
            let client = PaperscopeClient::from_config(&config, None)?;
            analyze::handle_analyze(&args, &client).await
        }
        Commands::Chat(args) => {
            let client = PaperscopeClient::from_config(&config, None)?;
            analyze::handle_chat(&args, &client).await
        }
        Commands::Authors(args) => {
            let client = PaperscopeClient::from_config(&config, None)?;
            analyze::handle_authors(&args, &client).await
        }
        Commands::Markdown(args) => {
            let client = PaperscopeClient::from_config(&config, None)?;
            analyze::handle_markdown(&args, &client).await
        }
        Commands::Config(ConfigCommands::Init(args)) => handle_config_init(&args),
        Commands::Completions(args) => {
            handle_completions(&args, &mut std::io::stdout());
            Ok(String::new())
        }
    }
}
