use near_workspaces::network::{NetworkClient, NetworkInfo};
use near_workspaces::result::ExecutionFinalResult;
use near_workspaces::{Contract, DevNetwork, Worker};

/// Build contract from sources and initialize it
pub async fn build_contract<T>(
    worker: &Worker<T>,
    project_path: &str,
    init_method: &str,
    args: near_sdk::serde_json::Value,
) -> anyhow::Result<Contract>
where
    T: NetworkInfo + NetworkClient + DevNetwork + Send + Sync,
{
    let mut wasm;
    let mut retry_count = 3;
    // Under some circumstances compilation could provide zero length built wasm. In this case we retry.
    loop {
        wasm = near_workspaces::compile_project(project_path).await?;
        if !wasm.is_empty() || retry_count == 0 {
            break;
        }
        retry_count -= 1;
    }

    let (id, sk) = worker.dev_generate().await;

    let contract = worker
        .create_tla_and_deploy(id, sk, &wasm)
        .await?
        .into_result()?;

    // initialize contract
    let _ = contract
        .call(init_method)
        .args_json(args)
        .max_gas()
        .transact()
        .await?
        .into_result()?;

    Ok(contract)
}

/// Get current block timestamp
pub async fn get_block_timestamp<T>(worker: &Worker<T>) -> anyhow::Result<u64>
where
    T: NetworkClient + Send + Sync,
{
    Ok(worker.view_block().await?.timestamp())
}

/// Asserts the transaction failed and one of its failed outcomes mentions `msg`.
pub fn assert_failure_with(res: &ExecutionFinalResult, msg: &str) {
    assert!(res.is_failure(), "expected failure with {:?}", msg);
    let failures = format!("{:?}", res.failures());
    assert!(
        failures.contains(msg),
        "expected {:?} in failures: {}",
        msg,
        failures
    );
}
