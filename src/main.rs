// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use postgres_operator::build;
use postgres_operator::types::v1alpha1::cluster::PodRole;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pg-op")]
#[command(version = build::PKG_VERSION)]
#[command(about = "PostgreSQL Kubernetes Operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Output CRDs in YAML
    Crd {
        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Output the Pod of a cluster instance in YAML
    Pod {
        /// Cluster manifest
        #[arg(short, long)]
        cluster: PathBuf,

        /// Node serial of the instance
        #[arg(short, long)]
        serial: u32,

        #[arg(short, long, value_enum, default_value_t = PodRole::Primary)]
        role: PodRole,

        /// Overrides the namespace of the cluster manifest
        #[arg(short, long)]
        namespace: Option<String>,

        /// Specs configuration overriding the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    postgres_operator::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crd { file } => postgres_operator::crd(file.as_deref()).await?,
        Commands::Pod {
            cluster,
            serial,
            role,
            namespace,
            config,
            file,
        } => {
            postgres_operator::pod(
                &cluster,
                serial,
                role,
                namespace,
                config.as_deref(),
                file.as_deref(),
            )
            .await?
        }
    }

    Ok(())
}
