use crate::generator::profile::{build_tracks_from_config, GeneratorConfig};
use crate::gui_bridge::model::VisualizationModel;
use crate::ingest::feed::{tracks_from_feed, FeedResponse, MachineTracks};
use crate::workflow::runner::Runner;
use anyhow::Result;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

type SharedModel = Arc<RwLock<VisualizationModel>>;

fn refresh(
    runner: &Runner,
    tracks: &MachineTracks,
    state: &SharedModel,
) -> Result<VisualizationModel> {
    let result = runner.execute(tracks)?;
    let model = VisualizationModel::from_result(&result, runner.config().gradient_field);
    let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
    *guard = model.clone();
    Ok(model)
}

/// Bridge that serves the latest overlay and accepts new feed payloads.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>, address: SocketAddr) -> Self {
        let state: SharedModel = Arc::new(RwLock::new(VisualizationModel::default()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("overlay")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| {
                let guard = state.read().unwrap_or_else(PoisonError::into_inner);
                warp::reply::json(&*guard)
            });

        let ingest_route = warp::path("ingest")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(runner_filter.clone())
            .and_then(
                |feed: FeedResponse, state: SharedModel, runner: Arc<Runner>| async move {
                    match tracks_from_feed(feed)
                        .and_then(|tracks| refresh(&runner, &tracks, &state))
                    {
                        Ok(model) => Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "ok",
                                "machines": model.machines.len(),
                                "predictions": model.prediction_count,
                            })),
                            StatusCode::OK,
                        )),
                        Err(err) => {
                            error!("ingest error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        let generator_route = warp::path("ingest-config")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: GeneratorConfig, state: SharedModel, runner: Arc<Runner>| async move {
                    match build_tracks_from_config(&config)
                        .and_then(|tracks| refresh(&runner, &tracks, &state))
                    {
                        Ok(model) => {
                            if let Some(name) = config.scenario.as_ref() {
                                println!(
                                    "[GUI] Scenario {} -> predictions {}",
                                    name, model.prediction_count
                                );
                            }
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "machines": model.machines.len(),
                                    "predictions": model.prediction_count,
                                    "description": config.description.clone().unwrap_or_default()
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            error!("ingest-config error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(ingest_route).or(generator_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(address) {
                    Ok((bound, server)) => {
                        info!("overlay bridge listening on {}", bound);
                        server.await;
                    }
                    Err(err) => error!("failed to bind overlay bridge on {}: {}", address, err),
                }
            });
        });

        Self { state }
    }

    pub fn publish(&self, model: &VisualizationModel) -> Result<()> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = model.clone();
        println!(
            "[GUI] machines: {}, predictions: {}, gradient segments: {}",
            guard.machines.len(),
            guard.prediction_count,
            guard.segment_count
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
