use std::{fs, io::ErrorKind, path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::H160,
};
use serde_json::{json, Value};

/// Polls the node once per second until contract code is present at the
/// address. No timeout: a node that never answers hangs the process, and an
/// RPC error propagates instead of being retried.
pub async fn wait_deployed(
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    address: H160,
) -> Result<()> {
    loop {
        let code = client.get_code(address, None).await?;
        if !code.is_empty() {
            return Ok(());
        }
        log::debug!("no code at {address:?} yet");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Records `name -> address` under the `deployments` key of the ledger file,
/// creating the file when absent and leaving other entries intact.
pub fn write_deployed_address(path: &Path, name: &str, address: H160) -> Result<()> {
    let mut ledger: Value = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse deployments file {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => json!({}),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read deployments file {}", path.display()))
        }
    };

    ledger["deployments"][name] = json!(format!("{address:?}"));

    fs::write(path, serde_json::to_string_pretty(&ledger)?)
        .with_context(|| format!("failed to write deployments file {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ethers::types::H160;
    use tempfile::TempDir;

    use super::write_deployed_address;

    fn read_ledger(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn creates_the_ledger_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        let address = H160::repeat_byte(0x11);

        write_deployed_address(&path, "XOXO", address).unwrap();

        let ledger = read_ledger(&path);
        assert_eq!(ledger["deployments"]["XOXO"], format!("{address:?}"));
    }

    #[test]
    fn preserves_entries_for_other_contracts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{"deployments": {"Token": "0xabc"}}"#).unwrap();
        let address = H160::repeat_byte(0x22);

        write_deployed_address(&path, "XOXO", address).unwrap();

        let ledger = read_ledger(&path);
        assert_eq!(ledger["deployments"]["Token"], "0xabc");
        assert_eq!(ledger["deployments"]["XOXO"], format!("{address:?}"));
    }

    #[test]
    fn overwrites_a_stale_address_for_the_same_contract() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");

        write_deployed_address(&path, "XOXO", H160::repeat_byte(0x33)).unwrap();
        write_deployed_address(&path, "XOXO", H160::repeat_byte(0x44)).unwrap();

        let ledger = read_ledger(&path);
        assert_eq!(
            ledger["deployments"]["XOXO"],
            format!("{:?}", H160::repeat_byte(0x44))
        );
    }

    #[test]
    fn rejects_a_corrupt_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "not json").unwrap();

        let err = write_deployed_address(&path, "XOXO", H160::zero()).unwrap_err();

        assert!(err.to_string().contains("failed to parse"));
    }
}
