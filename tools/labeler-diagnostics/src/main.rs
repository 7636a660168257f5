//! labeler-diagnostics: AT Protocol Labeler Diagnostics
//!
//! Checks a labeler's signatures and declared policies over both label
//! transports.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use label_assessment::{LabelAssessmentService, PolicySet, XrpcQueryClient, XrpcStreamClient};
use labeler_diagnostics::cli::normalize_url;
use labeler_diagnostics::{orchestrator, render, Args, DiagnosticsConfig, PolicyClient, RunPlan};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = DiagnosticsConfig::from_env();
    let user_agent = args.agent.clone().unwrap_or(config.user_agent.clone());

    println!("AT Protocol Labeler Diagnostics\n");

    let policies = resolve_policies(&args, &config, &user_agent).await;

    let plan = RunPlan {
        endpoint: args.endpoint.clone(),
        key: args.key.clone(),
        policies,
        user_agent,
        depth: args.depth,
        deadline: config.result_timeout,
        run_query: !args.skip_query,
        run_subscribe: !args.skip_subscribe,
    };
    info!(endpoint = %plan.endpoint, depth = plan.depth, "Starting diagnostics");

    let service = LabelAssessmentService::new(
        XrpcQueryClient::new(config.engine.request_timeout)?,
        XrpcStreamClient::new(),
        config.engine.clone(),
    );
    let report = orchestrator::run(&service, &plan, &config.engine).await;

    for transport in &report.transports {
        for line in render::render_transport(transport) {
            println!("{}", line);
        }
    }

    println!("\nAll done!");
    Ok(())
}

/// Explicit `--labels`, else the labeler's service record when a DID is known.
async fn resolve_policies(
    args: &Args,
    config: &DiagnosticsConfig,
    user_agent: &str,
) -> Option<PolicySet> {
    if let Some(policies) = args.policy_set() {
        return Some(policies);
    }
    let did = args.did.as_deref()?;

    let pds = match &args.pds {
        Some(pds) => pds.clone(),
        None => match normalize_url(&config.pds) {
            Ok(pds) => pds,
            Err(e) => {
                println!("{}", render::render_policy_failure(&e));
                return None;
            }
        },
    };

    let lookup = match PolicyClient::new(config.engine.request_timeout) {
        Ok(client) => client.resolve_policies(&pds, did, user_agent).await,
        Err(e) => Err(e),
    };
    match lookup {
        Ok(policies) => {
            for line in render::render_policies(&policies) {
                println!("{}", line);
            }
            Some(policies)
        }
        Err(e) => {
            println!("{}", render::render_policy_failure(&e.to_string()));
            None
        }
    }
}
