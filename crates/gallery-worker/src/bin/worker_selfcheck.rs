use gallery_firestore::FirestoreConfig;
use gallery_models::Bucket;
use gallery_storage::R2Client;
use gallery_worker::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
    dotenvy::dotenv().ok();

    let config = PipelineConfig::from_env();
    println!(
        "worker-selfcheck: starting with provider={} subclip={}x{}",
        config.provider, config.subclip_width, config.subclip_height
    );

    let firestore = FirestoreConfig::from_env()?;
    if firestore.emulator_host.is_none() {
        ensure_env_present(&["GOOGLE_APPLICATION_CREDENTIALS"])?;
    }

    let blobs = R2Client::from_env()?;
    blobs.check_connectivity().await?;

    // Key outside the provider layout; absence is the expected answer.
    let present = blobs.exists(Bucket::Originals, "selfcheck/missing").await?;
    println!("worker-selfcheck: originals head_object ok (present={})", present);

    println!("worker-selfcheck: ok");
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
