use std::{path::Path, sync::Arc};

use anyhow::Result;
use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::H160,
    utils::hex,
};

use crate::{
    artifact::Artifact,
    utils::{wait_deployed, write_deployed_address},
};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct Deploy {
    client: Arc<Client>,
    confirmations: usize,
}

impl Deploy {
    pub async fn new(rpc: &str, sk: &str, confirmations: usize) -> Result<Self> {
        let wallet = LocalWallet::from_bytes(&hex::decode(sk.strip_prefix("0x").unwrap_or(sk))?)?;
        let provider = Provider::<Http>::try_from(rpc)?;

        let chain_id = provider.get_chainid().await?.as_u64();
        log::info!("deploying to chain id {chain_id}");

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));

        Ok(Self {
            client,
            confirmations,
        })
    }

    pub async fn run(&self, artifact: Artifact, deployments: Option<&Path>) -> Result<()> {
        let address = self.deploy_contract(&artifact).await?;
        wait_deployed(self.client.clone(), address).await?;

        println!("{}", deployment_line(&artifact.contract_name, address));

        if let Some(path) = deployments {
            write_deployed_address(path, &artifact.contract_name, address)?;
        }

        Ok(())
    }

    async fn deploy_contract(&self, artifact: &Artifact) -> Result<H160> {
        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );

        log::info!("deploying {}", artifact.contract_name);
        let contract = factory
            .deploy(())?
            .confirmations(self.confirmations)
            .send()
            .await?;

        Ok(contract.address())
    }
}

pub fn deployment_line(name: &str, address: H160) -> String {
    format!("{name} deployed to: {address:?}")
}
