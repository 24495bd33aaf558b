use actix::prelude::*;
use colored::Color;
use common::config::TrackerConfig;
use common::logger::Logger;
use common::notifications::{LoggerNotifier, Notifier};
use delivery::api::{DeliveryApi, HttpDeliveryApi, StaticToken};
use delivery::console::run_console;
use delivery::delivery_actors::dispatcher::CommandDispatcher;
use delivery::delivery_actors::tracker::DeliveryTracker;
use delivery::messages::StopTracking;
use std::env;
use std::sync::Arc;
use tokio::signal::ctrl_c;

#[actix::main]
async fn main() -> std::io::Result<()> {
    let logger = Logger::new("Delivery", Color::Green);

    let mut config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger.error(e.to_string());
            std::process::exit(2);
        }
    };
    // The first argument, if any, overrides the configured pincode.
    if let Some(pincode) = env::args().nth(1) {
        config = config.with_pincode(pincode);
    }

    let api: Arc<dyn DeliveryApi> = match HttpDeliveryApi::new(
        config.api_url.clone(),
        config.request_timeout,
        Arc::new(StaticToken(config.access_token.clone())),
    ) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            logger.error(e.to_string());
            std::process::exit(2);
        }
    };
    let notifier: Arc<dyn Notifier> =
        Arc::new(LoggerNotifier::new(Logger::new("Notice", Color::BrightWhite)));

    let tracker = match DeliveryTracker::start_tracking(&config, api.clone(), notifier.clone()) {
        Ok(tracker) => tracker,
        // The tracker already notified the configuration error.
        Err(_) => {
            eprintln!("Uso: delivery <pincode>  (o definir DELIVERY_PINCODE)");
            std::process::exit(1);
        }
    };
    let dispatcher = CommandDispatcher::new(api, tracker.clone(), notifier).start();

    logger.info(format!("Using API at {}", config.api_url));

    tokio::select! {
        _ = run_console(tracker.clone(), dispatcher, logger.clone()) => {
            logger.info("Console closed, shutting down...");
        }
        _ = ctrl_c() => {
            logger.info("Ctrl-C received, shutting down...");
        }
    }

    tracker.do_send(StopTracking);
    actix::System::current().stop();
    Ok(())
}
