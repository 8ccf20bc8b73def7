use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{artifact, deploy::Deploy};

#[derive(Debug, Parser)]
pub struct CommandLine {
    /// HTTP JSON-RPC endpoint of the target network
    #[clap(short, long)]
    rpc: String,

    /// Deployer private key in hex, with or without the 0x prefix
    #[clap(long)]
    sk: String,

    /// Root of the compiled-artifact tree
    #[clap(short, long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Name of the contract to deploy
    #[clap(short, long, default_value = "XOXO")]
    contract: String,

    /// Block confirmations to wait for on the deployment transaction
    #[clap(long, default_value_t = 1)]
    confirmations: usize,

    /// JSON ledger file to record the deployed address in
    #[clap(long)]
    deployments: Option<PathBuf>,
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let artifact = artifact::find_artifact(&self.artifacts_dir, &self.contract)?;
        let deploy = Deploy::new(&self.rpc, &self.sk, self.confirmations).await?;
        deploy.run(artifact, self.deployments.as_deref()).await
    }
}
