/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use clap::Parser;
use iommu_report::{
    ConfigOverrides, ContainerConfigBuilder, RunOutcome, RunRequest, ServiceContainer,
    TomlConfigurationProvider,
};
use std::error::Error;
use std::path::PathBuf;
use std::process;

/// Collect board, BIOS and IOMMU group data and submit it to iommu.info
#[derive(Parser, Debug)]
#[command(name = "iommu_report", version, about, long_about = None)]
struct Cli {
    /// Read `lspci -nnvmm` output from a file instead of running lspci
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Use a JSON hardware record instead of reading the DMI tables
    #[arg(short, long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Print the record instead of submitting it
    #[arg(long)]
    dry_run: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "IOMMU_INFO_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Directory holding the DMI files
    #[arg(long, value_name = "DIR")]
    dmi_path: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG still wins when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn print_outcome(outcome: &RunOutcome) -> Result<(), Box<dyn Error>> {
    if outcome.dry_run {
        println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    } else if let Some(receipt) = &outcome.receipt {
        println!("Success, thanks for contributing to the project.");
        if let Some(url) = &receipt.view_url {
            println!("To view your submission online see {url}");
        }
    }

    if let Some(path) = &outcome.dump_path {
        println!("The assembled record was saved to {}", path.display());
    }

    if !outcome.report.is_empty() {
        eprint!("{}", outcome.report.render(outcome.dump_path.as_deref()));
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    let overrides = ConfigOverrides {
        dmi_path: cli.dmi_path,
        api_url: cli.api_url,
        dry_run: cli.dry_run,
    };
    let provider = TomlConfigurationProvider::load(cli.config.as_deref(), overrides)?;

    let config = ContainerConfigBuilder::new()
        .from_provider(&provider)
        .await?
        .lspci_file(cli.file)
        .build();
    log::debug!("Using {config:?}");

    let container = ServiceContainer::new(config);
    let service = container.create_submission_service()?;

    let outcome = service
        .run(RunRequest {
            data_file: cli.data,
            dry_run: cli.dry_run,
        })
        .await?;

    print_outcome(&outcome)?;
    Ok(outcome.exit_code())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}
