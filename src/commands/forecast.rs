use crate::error::AppError;
use crate::services;

pub async fn run(symbol: &str) {
    match forecast_and_print(symbol).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Forecasting error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn forecast_and_print(symbol: &str) -> Result<(), AppError> {
    println!("📈 Forecasting {} ({} days ahead)...\n", symbol.to_uppercase(), crate::constants::FORECAST_HORIZON_DAYS);

    let mut client = super::build_client();
    let forecast = services::forecast_symbol(&mut client, symbol).await?;

    println!(
        "   Trained on {} daily bars, predicting {} days\n",
        forecast.trained_on, forecast.horizon_days
    );

    println!(
        "{:<12} {:>10} {:>10} {:>10}",
        "Date", "Predicted", "Lower", "Upper"
    );
    // Tail of the horizon, the part the dashboard shows
    let future = forecast.future();
    let tail_start = future.len().saturating_sub(5);
    for point in &future[tail_start..] {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2}",
            point.time.format("%Y-%m-%d"),
            point.predicted,
            point.lower,
            point.upper
        );
    }

    Ok(())
}
