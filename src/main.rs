use clap::Parser;
use tagrender::application::{
    ConfigService, ListTagsService, RenderOptions, RenderService, VariantOptions, VariantService,
};
use tagrender::application::manage_config::VALID_KEYS;
use tagrender::cli::{format_tag_list, format_variant_report, Cli, Commands};
use tagrender::error::TagRenderError;
use tagrender::infrastructure::RenderConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tagrender=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagrender=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), TagRenderError> {
    match cli.command {
        Commands::Render {
            template,
            data,
            output,
            format,
            tags,
            iterate,
            config,
        } => {
            let cwd = std::env::current_dir()?;
            let config = RenderConfig::discover(config.as_deref(), &cwd)?;

            if iterate {
                let service = VariantService::new(config);
                let report = service.execute(VariantOptions {
                    template,
                    data,
                    output_dir: output.unwrap_or_else(|| "output".into()),
                    format,
                })?;

                print!("{}", format_variant_report(&report));
                report.into_result().map(|_| ())
            } else {
                let service = RenderService::new(config);
                let path = service.execute(RenderOptions {
                    template,
                    data,
                    output,
                    format,
                    tags,
                })?;

                println!("Output written to: {}", path.display());
                Ok(())
            }
        }
        Commands::Tags { data } => {
            let tags = ListTagsService::execute(&data)?;
            print!("{}", format_tag_list(&tags));
            if tags.is_empty() {
                println!();
            }
            Ok(())
        }
        Commands::Config {
            key,
            value,
            list,
            init,
            dir,
        } => {
            let service = ConfigService::new(dir);

            if init {
                let path = service.init()?;
                println!("Created {}", path.display());
                Ok(())
            } else if list {
                print!("{}", service.show()?);
                Ok(())
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                } else {
                    println!("{}", service.get(&k)?);
                }
                Ok(())
            } else {
                println!("Usage: tagrender config [--list | --init | <key> [<value>]]");
                println!("Valid keys: {}", VALID_KEYS);
                Ok(())
            }
        }
    }
}
