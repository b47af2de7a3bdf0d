//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server. The bearer credential
//! comes from the inferred client configuration; the resolver itself never
//! manages credentials.

use anyhow::Result;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer().await?;
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Ambient namespace override from the NAMESPACE environment variable
pub fn get_default_namespace() -> Option<String> {
    std::env::var("NAMESPACE").ok().filter(|ns| !ns.is_empty())
}
