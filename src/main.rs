use anyhow::Context;
use clap::{Parser, Subcommand};
use quickstart_index::client::{ControlPlane, Connector, HttpConnector};
use quickstart_index::provision::{self, WaitPolicy};
use quickstart_index::{CreateIndex, Metric, Settings};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about = "Provision an index on a hosted vector database")]
struct Cli {
    /// Deployment region (overrides PINECONE_ENVIRONMENT)
    #[arg(long, global = true)]
    environment: Option<String>,

    /// Controller base URL (overrides PINECONE_CONTROLLER_HOST)
    #[arg(long, global = true)]
    controller_host: Option<String>,

    /// Seconds to wait for a new index to become ready; -1 returns immediately
    #[arg(long, global = true, allow_negative_numbers = true)]
    timeout: Option<i64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Create the quickstart index (quickstart2, dimension 8, euclidean)
    Quickstart,
    /// Create an index with explicit parameters
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        dimension: u32,
        #[arg(long, default_value = "cosine")]
        metric: Metric,
        #[arg(long)]
        pods: Option<u32>,
        #[arg(long)]
        replicas: Option<u32>,
        #[arg(long)]
        pod_type: Option<String>,
    },
    /// Print an index description as JSON
    Describe { name: String },
    /// List index names
    List,
    /// Delete an index
    Delete { name: String },
}

impl Cli {
    /// The subcommand to run; no subcommand means the quickstart.
    fn take_command(&mut self) -> Cmd {
        self.cmd.take().unwrap_or(Cmd::Quickstart)
    }

    fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_timeout_secs(self.timeout)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::from_env().context("Failed to resolve settings")?;
    if let Some(environment) = cli.environment.take() {
        settings = settings.with_environment(environment);
    }
    if let Some(host) = cli.controller_host.take() {
        settings = settings.with_controller_host(host);
    }
    settings.validate()?;

    let connector = HttpConnector::from_settings(&settings);
    let wait = cli.wait_policy();

    match cli.take_command() {
        Cmd::Quickstart => {
            provision::run_quickstart(&connector, &settings, wait)
                .await
                .context("Quickstart index creation failed")?;
        }
        Cmd::Create {
            name,
            dimension,
            metric,
            pods,
            replicas,
            pod_type,
        } => {
            let mut spec = CreateIndex::new(name, dimension, metric);
            spec.pods = pods;
            spec.replicas = replicas;
            spec.pod_type = pod_type;
            provision::provision(&connector, &settings, &spec, wait)
                .await
                .with_context(|| format!("Failed to create index {}", spec.name))?;
        }
        Cmd::Describe { name } => {
            let session = connector
                .init(&settings.credential, &settings.environment)
                .await
                .context("Failed to initialize controller session")?;
            let description = session
                .describe_index(&name)
                .await
                .with_context(|| format!("Failed to describe index {}", name))?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Cmd::List => {
            let session = connector
                .init(&settings.credential, &settings.environment)
                .await
                .context("Failed to initialize controller session")?;
            for name in session.list_indexes().await.context("Failed to list indexes")? {
                println!("{}", name);
            }
        }
        Cmd::Delete { name } => {
            let session = connector
                .init(&settings.credential, &settings.environment)
                .await
                .context("Failed to initialize controller session")?;
            session
                .delete_index(&name)
                .await
                .with_context(|| format!("Failed to delete index {}", name))?;
            tracing::info!(index = %name, "Index deletion requested");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_quickstart() {
        let mut cli = Cli::try_parse_from(["quickstart-index"]).unwrap();
        assert!(matches!(cli.take_command(), Cmd::Quickstart));
        assert_eq!(cli.wait_policy(), WaitPolicy::Indefinite);
    }

    #[test]
    fn test_negative_timeout_skips_wait() {
        let cli = Cli::try_parse_from(["quickstart-index", "--timeout", "-1"]).unwrap();
        assert_eq!(cli.wait_policy(), WaitPolicy::NoWait);

        // global flag after the subcommand
        let mut cli =
            Cli::try_parse_from(["quickstart-index", "quickstart", "--timeout", "-1"]).unwrap();
        assert_eq!(cli.wait_policy(), WaitPolicy::NoWait);
        assert!(matches!(cli.take_command(), Cmd::Quickstart));

        let cli = Cli::try_parse_from(["quickstart-index", "--timeout", "30"]).unwrap();
        assert_eq!(
            cli.wait_policy(),
            WaitPolicy::Timeout(std::time::Duration::from_secs(30))
        );
    }

    #[test]
    fn test_create_metric_is_case_insensitive() {
        let mut cli = Cli::try_parse_from([
            "quickstart-index",
            "create",
            "--name",
            "docs",
            "--dimension",
            "384",
            "--metric",
            "DotProduct",
        ])
        .unwrap();
        match cli.take_command() {
            Cmd::Create {
                name,
                dimension,
                metric,
                pods,
                ..
            } => {
                assert_eq!(name, "docs");
                assert_eq!(dimension, 384);
                assert_eq!(metric, Metric::Dotproduct);
                assert_eq!(pods, None);
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_unknown_metric() {
        let result = Cli::try_parse_from([
            "quickstart-index",
            "create",
            "--name",
            "docs",
            "--dimension",
            "384",
            "--metric",
            "manhattan",
        ]);
        assert!(result.is_err());
    }
}
