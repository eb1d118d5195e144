use dcard_history::{
    Credentials, HistoryFetcher, PortalEndpoints, ScrapingConfig, SessionAuthenticator,
    StdinAuthCode, YearMonth,
};
use dotenv::dotenv;
use log::{LevelFilter, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = ScrapingConfig::new()?;
    let credentials = Credentials::prompt()?;

    let authenticator = SessionAuthenticator::new(
        PortalEndpoints::default(),
        config.cookie_path.clone(),
        config.request_delay,
    );
    let session = authenticator
        .login(&credentials, &mut StdinAuthCode)
        .await?;

    let fetcher = HistoryFetcher::new(config.csv_dir.clone());
    let this_month = YearMonth::current()?;
    for year_month in [this_month, this_month.succ()?] {
        let path = fetcher.save_month(&session, year_month).await?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}
